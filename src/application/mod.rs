mod session;

pub use session::GameSession;
