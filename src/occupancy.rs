use enum_ordinalize::Ordinalize;

/// The steady state every occupancy channel derives from the active count.
#[derive(Ordinalize, Debug, PartialEq, Eq, Clone, Copy)]
#[repr(usize)]
pub enum OccupancyLevel {
    Empty,
    HasSpace,
    LastSlot,
    Full,
}

impl OccupancyLevel {
    /*
     * The order of the checks matters for tiny spaces: with a capacity of
     * one, a single occupant is `Full` rather than `LastSlot`, and nobody is
     * `Empty` rather than `LastSlot`.
     *
     * There is no hysteresis. Channels sample periodically and people move
     * slowly, so a flicker between two samples at a threshold is fine.
     */
    pub fn classify(active_occupants: usize, capacity: usize) -> Self {
        if active_occupants == 0 {
            OccupancyLevel::Empty
        } else if active_occupants >= capacity {
            OccupancyLevel::Full
        } else if active_occupants == capacity - 1 {
            OccupancyLevel::LastSlot
        } else {
            OccupancyLevel::HasSpace
        }
    }
}
