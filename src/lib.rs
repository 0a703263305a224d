pub mod annotation;
pub mod catalog;
pub mod constants;
pub mod earth_orientation;
pub mod ephemeris;
pub mod format;
pub mod observer;
pub mod ref_system;
pub mod search;
pub mod seasons;
pub mod skypath;
pub mod skypath_errors;
pub mod star_path;
pub mod target;
pub mod time;
pub mod timezone;
