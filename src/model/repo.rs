#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    UserRecord,
    UserProgress,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}
