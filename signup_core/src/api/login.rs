/// Where the login page lives. Successful registrations end up here.
pub const PATH: &str = "/login";
