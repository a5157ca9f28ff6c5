mod admin;
mod login;
mod session;
