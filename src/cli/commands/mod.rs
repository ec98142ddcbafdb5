pub mod classify;
pub mod config;
pub mod init;
pub mod menu;
pub mod pages;
pub mod rules;
