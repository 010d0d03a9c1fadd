pub mod io;
pub mod mime;
pub mod object;
pub mod options;
