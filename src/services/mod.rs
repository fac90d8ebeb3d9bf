pub mod horoscope;
pub mod vision;
