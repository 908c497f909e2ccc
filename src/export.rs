//! Sell-back (export) relay decision

use crate::controller::PowerSource;

/// Whether surplus should be fed back into the grid.
///
/// Never while the house imports from the grid. On battery, only when the
/// grid can take it, a renewable source is charging and the bank is in the
/// high band; otherwise renewable output keeps charging the battery.
pub const fn export_decision(
    source: PowerSource,
    ac_avail: bool,
    renewable: bool,
    is_high: bool,
) -> bool {
    match source {
        PowerSource::Ac => false,
        PowerSource::Dc => ac_avail && renewable && is_high,
    }
}
