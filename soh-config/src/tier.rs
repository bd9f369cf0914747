use core::fmt;

/// The evaluation tier an operator config is resolved for.
///
/// Each tier reads exactly one leaf field; the others must stay empty in a
/// terminal operator of that tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Stations roll up into a group.
    Group,
    /// Channels roll up into a station.
    Station,
    /// Monitor types roll up into a channel.
    Channel,
}

impl Tier {
    /// Name of the leaf field this tier reads.
    pub fn leaf_field(&self) -> &'static str {
        match self {
            Tier::Group => "station_operands",
            Tier::Station => "channel_operands",
            Tier::Channel => "monitor_type_operands",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Group => "group",
            Tier::Station => "station",
            Tier::Channel => "channel",
        })
    }
}
