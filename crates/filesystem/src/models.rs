/// Directory and file helpers shared by bootstrap and the local storage backend
pub struct FileSystem;
