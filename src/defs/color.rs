use bincode::{Decode, Encode};

/// 8-bit RGBA colour carried by characters and floaters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Attribution colour for environmental damage.
    pub const NEUTRAL: Rgba = Rgba::rgb(96, 96, 96);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale every channel by `keep / span` (`keep <= span`).
    pub fn fade(self, keep: u64, span: u64) -> Self {
        let f = |c: u8| (c as u64 * keep / span) as u8;
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: f(self.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_is_linear_per_channel() {
        let c = Rgba::rgb(200, 100, 0).fade(1, 2);
        assert_eq!(c, Rgba { r: 100, g: 50, b: 0, a: 127 });
    }
}
