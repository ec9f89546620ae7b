/// Where a newly connected slot lands within its section or group.
///
/// Ungrouped slots connected `AtFront` join the front section ahead of every slot already there,
/// ungrouped slots connected `AtBack` join the back section behind every slot already there.
/// Grouped slots are placed at the front or back of their group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    AtFront,
    #[default]
    AtBack,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::AtFront => write!(f, "at_front"),
            Position::AtBack => write!(f, "at_back"),
        }
    }
}
