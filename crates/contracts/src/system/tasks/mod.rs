pub mod aggregate;
pub mod descriptor;
pub mod request;
pub mod response;
