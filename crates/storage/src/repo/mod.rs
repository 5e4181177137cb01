mod aliases;
mod cache;
mod comments;
mod users;
