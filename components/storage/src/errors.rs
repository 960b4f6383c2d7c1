quick_error! {
    /// Errors occur when set/get with storage
    #[derive(Debug, PartialEq, Eq)]
    pub enum StorageError {
        DBError(msg: String) {
            from(msg: String) -> (msg)
            display("got db error:{}", msg)
        }

        BadStatus(name: String, size: usize) {
            display("status {} must be 8 bytes, but:{}", name, size)
        }
    }
}
