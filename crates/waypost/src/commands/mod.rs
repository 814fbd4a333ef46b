pub mod mode;
pub mod policy;
pub mod prefs;
pub mod run;
pub mod sim;
pub mod version;
