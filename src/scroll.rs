use std::iter::FusedIterator;

/// Marquee frames over `text` for a display `width` characters wide.
///
/// Text that fits yields a single frame. Wider text slides left one column per
/// frame and then wraps around with a single blank column between its end and
/// its start, so the last frame is followed seamlessly by the first one of the
/// next cycle.
pub fn scroll<S: AsRef<str>>(text: S, width: usize) -> Marquee {
    let chars = text.as_ref().chars().collect::<Vec<_>>();

    let frames = if chars.len() > width && width > 0 {
        chars.len() + 1
    } else {
        1
    };

    Marquee {
        chars,
        width,
        offset: 0,
        frames,
    }
}

#[derive(Debug, Clone)]
pub struct Marquee {
    chars: Vec<char>,
    width: usize,
    offset: usize,
    frames: usize,
}

impl Marquee {
    fn frame(&self, offset: usize) -> String {
        if self.width == 0 {
            return String::new();
        }

        if self.frames == 1 {
            return self.chars.iter().collect();
        }

        // Window over `text + " "` treated as a loop.
        let period = self.chars.len() + 1;
        (offset..offset + self.width)
            .map(|idx| self.chars.get(idx % period).copied().unwrap_or(' '))
            .collect()
    }
}

impl Iterator for Marquee {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.frames {
            return None;
        }

        let frame = self.frame(self.offset);
        self.offset += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.frames - self.offset;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Marquee {}

impl FusedIterator for Marquee {}
