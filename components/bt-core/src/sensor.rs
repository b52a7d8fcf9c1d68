pub mod line_level;
