use crate::shared::Coordinate;

/// What the engine needs from a platform location subsystem.
///
/// Acquisition, permissions and cancellation all live outside the engine; it
/// only asks for the most recent fix and whether tracking is currently
/// permitted at all.
pub trait LocationProvider {
    fn latest_fix(&self) -> Option<Coordinate>;

    fn tracking_permitted(&self) -> bool;
}
