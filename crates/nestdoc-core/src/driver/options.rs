/// Parameters for opening a physical connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,

    /// Name of the database to use once connected
    pub database: String,
}

/// Sorting and paging applied to a `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Storage field names with their sort direction, most significant first
    pub sort: Vec<(String, Direction)>,

    pub limit: Option<u64>,

    pub skip: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl ConnectOptions {
    /// Address in `host:port` form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FindOptions {
    pub fn is_default(&self) -> bool {
        *self == FindOptions::default()
    }
}
