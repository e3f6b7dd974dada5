pub mod atomic_file;
pub mod backup_repository;
pub mod pid_repository;
pub mod state_repository;

pub use backup_repository::FileDnsBackupRepository;
pub use pid_repository::FilePidRepository;
pub use state_repository::FileDaemonStateRepository;
