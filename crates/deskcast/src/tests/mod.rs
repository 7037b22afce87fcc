mod media_type;
mod persistence;
