pub mod hour_tz;

use jiff::Zoned;

pub trait IntervalTzLike {
    fn start(&self) -> Zoned;
    fn end(&self) -> Zoned;
}
