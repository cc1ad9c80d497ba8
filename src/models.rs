pub mod calendar;
pub mod chat;
pub mod crm;
pub mod finance;
pub mod identity;
pub mod journal;
pub mod profile;
pub mod settings;
pub mod tasks;
