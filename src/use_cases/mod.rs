pub mod login;
pub mod logout;
pub mod profile;
pub mod verify_session;

#[cfg(test)]
pub(crate) mod test_support;

pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use profile::ProfileUseCase;
pub use verify_session::VerifySessionUseCase;
