// src/handlers.rs

pub mod calendar;
pub mod chat;
pub mod crm;
pub mod finance;
pub mod journal;
pub mod profiles;
pub mod settings;
pub mod tasks;
