// Reveal animator - turns a response string into a finite rain animation
//
// Construction lays the message out on the viewport (pure function of
// message + viewport, so the resting layout is identical across runs) and
// spawns one falling stream per animated character plus a handful of
// ambient streams. Each tick advances the streams; a stream that reaches
// its target row settles that character permanently. A wall-clock deadline
// bounds the whole animation: when it passes, every remaining target is
// settled in the same tick so the message always ends up fully readable.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

/// Fixed cadence the TUI drives the animation at (~30 fps)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Hard wall-clock cap on one animation run
pub const MAX_ANIMATION_TIME: Duration = Duration::from_secs(15);

/// Columns kept clear on each side of the settled text block
const WRAP_MARGIN: u16 = 8;

/// At most this many message lines are shown; the rest are truncated
const MAX_VISIBLE_LINES: usize = 15;

/// Replaces the last visible line when the message is cut short
const TRUNCATION_MARKER: &str = "... (Response truncated)";

/// Cap on characters that get their own falling stream; the rest settle
/// instantly so long responses stay cheap to animate
const MAX_ANIMATED_TARGETS: usize = 300;

/// Cap on streams that carry a target character
const MAX_CARRIER_STREAMS: usize = 100;

/// Cap on purely decorative streams
const MAX_AMBIENT_STREAMS: usize = 20;

/// Targets force-settled per frame when streams alone reveal fewer
const REVEAL_QUOTA: usize = 3;
const REVEAL_QUOTA_TAIL: usize = 5;
const TAIL_THRESHOLD: usize = 20;

/// Glyph pool for the falling noise
const NOISE_GLYPHS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;':\",./<>?";

/// A message character and the cell it must end up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCell {
    pub ch: char,
    pub x: u16,
    pub y: u16,
    pub settled: bool,
}

/// One falling stream of noise characters
#[derive(Debug, Clone)]
pub struct ColumnState {
    /// Screen column the stream falls in
    pub x: u16,
    /// Row of the stream head; fractional so per-column speeds differ
    pub pos: f32,
    /// Rows advanced per frame
    pub speed: f32,
    /// Characters drawn upward from the head; for carrier streams the
    /// head slot holds the target character itself
    pub trail: Vec<char>,
    /// Index into the target list, None for ambient streams
    pub target: Option<usize>,
    pub active: bool,
}

/// State machine for one animation run
pub struct RevealAnimator {
    width: u16,
    height: u16,
    targets: Vec<TargetCell>,
    columns: Vec<ColumnState>,
    deadline: Instant,
    finished: bool,
    rng: SmallRng,
}

impl RevealAnimator {
    pub fn new(message: &str, width: u16, height: u16) -> Self {
        Self::with_rng(message, width, height, SmallRng::from_os_rng())
    }

    /// Seeded construction for deterministic tests
    pub fn with_rng(message: &str, width: u16, height: u16, mut rng: SmallRng) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let mut targets = layout_targets(message, width, height);
        let animated = select_animated(&mut targets);

        let mut available: Vec<u16> = (0..width).collect();
        available.shuffle(&mut rng);

        let mut columns = Vec::new();
        let carriers = animated
            .len()
            .min(MAX_CARRIER_STREAMS)
            .min(available.len());
        for slot in 0..carriers {
            let ti = animated[slot];
            let target = targets[ti];
            // Streams aimed lower on the screen fall slightly faster so the
            // whole block resolves on a similar timeline
            let base = rng.random_range(0.8..1.5);
            let speed = base * (1.0 + target.y as f32 / height as f32);
            let trail_len = rng.random_range(3..=8);
            let mut trail = Vec::with_capacity(trail_len);
            trail.push(target.ch);
            for _ in 1..trail_len {
                trail.push(noise_glyph(&mut rng));
            }
            columns.push(ColumnState {
                x: available[slot],
                pos: rng.random_range(-(height as f32)..0.0),
                speed,
                trail,
                target: Some(ti),
                active: true,
            });
        }

        let ambient = ((width / 5) as usize)
            .min(MAX_AMBIENT_STREAMS)
            .min(available.len().saturating_sub(carriers));
        for slot in 0..ambient {
            let trail_len = rng.random_range(3..=6);
            let trail = (0..trail_len).map(|_| noise_glyph(&mut rng)).collect();
            columns.push(ColumnState {
                x: available[carriers + slot],
                pos: rng.random_range(-(height as f32)..0.0),
                speed: rng.random_range(0.8..2.0),
                trail,
                target: None,
                active: true,
            });
        }

        let finished = targets.iter().all(|t| t.settled);
        Self {
            width,
            height,
            targets,
            columns,
            deadline: Instant::now() + MAX_ANIMATION_TIME,
            finished,
            rng,
        }
    }

    /// Advance one frame. Returns true once the animation has finished;
    /// after that the call is a no-op and the settled layout is final.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.finished {
            return true;
        }
        if now >= self.deadline {
            self.force_settle();
            self.finished = true;
            tracing::debug!("animation deadline reached, settled remaining targets");
            return true;
        }

        let height = self.height as f32;
        let mut revealed_this_frame = 0usize;
        for col in self.columns.iter_mut() {
            if !col.active {
                continue;
            }
            col.pos += col.speed;
            match col.target {
                Some(ti) => {
                    let target = &mut self.targets[ti];
                    if !target.settled && col.pos >= target.y as f32 {
                        target.settled = true;
                        revealed_this_frame += 1;
                    }
                    // Carrier streams keep raining until they leave the screen
                    if target.settled && col.pos > height {
                        col.active = false;
                    }
                }
                None => {
                    // Ambient streams recycle from above the viewport
                    if col.pos > height {
                        col.pos = self.rng.random_range(-height / 2.0..0.0);
                    }
                }
            }
        }

        // Force-reveal a few stragglers per frame so targets without a
        // stream (long messages) never stall the animation
        let mut unsettled: Vec<usize> = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.settled)
            .map(|(i, _)| i)
            .collect();
        let quota = if unsettled.len() < TAIL_THRESHOLD {
            REVEAL_QUOTA_TAIL
        } else {
            REVEAL_QUOTA
        };
        while revealed_this_frame < quota && !unsettled.is_empty() {
            let pick = self.rng.random_range(0..unsettled.len());
            let ti = unsettled.swap_remove(pick);
            self.targets[ti].settled = true;
            revealed_this_frame += 1;
        }

        if unsettled.is_empty() && !self.targets.is_empty() {
            self.finished = true;
        }
        self.finished
    }

    /// Settle every remaining target immediately
    pub fn force_settle(&mut self) {
        for target in &mut self.targets {
            target.settled = true;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn targets(&self) -> &[TargetCell] {
        &self.targets
    }

    /// Settled characters in reading order
    #[allow(dead_code)] // test assertion helper
    pub fn settled_text(&self) -> String {
        let mut settled: Vec<&TargetCell> = self.targets.iter().filter(|t| t.settled).collect();
        settled.sort_by_key(|t| (t.y, t.x));
        settled.iter().map(|t| t.ch).collect()
    }
}

fn noise_glyph(rng: &mut SmallRng) -> char {
    NOISE_GLYPHS[rng.random_range(0..NOISE_GLYPHS.len())] as char
}

/// Map message characters to resting cells. Pure: the same message and
/// viewport always produce the same layout.
fn layout_targets(message: &str, width: u16, height: u16) -> Vec<TargetCell> {
    let wrap_width = width.saturating_sub(WRAP_MARGIN).max(1) as usize;
    let mut lines = wrap_message(message, wrap_width);

    let max_visible = (height.saturating_sub(WRAP_MARGIN) as usize).clamp(1, MAX_VISIBLE_LINES);
    if lines.len() > max_visible {
        lines.truncate(max_visible.saturating_sub(1));
        lines.push(TRUNCATION_MARKER.to_string());
    }

    let center_y = height as i32 / 2 - 5;
    let y_offset = (center_y - lines.len() as i32 / 2).max(1);

    let mut targets = Vec::new();
    for (li, line) in lines.iter().enumerate() {
        let y = y_offset + li as i32;
        if y < 0 || y >= height as i32 {
            continue;
        }
        let x_offset = 2 + (width as i32 - WRAP_MARGIN as i32 - line.chars().count() as i32) / 2;
        for (ci, ch) in line.chars().enumerate() {
            let x = x_offset + ci as i32;
            if x < 0 || x >= width as i32 {
                continue;
            }
            if ch == ' ' {
                continue;
            }
            targets.push(TargetCell {
                ch,
                x: x as u16,
                y: y as u16,
                // Non-printable characters never join the fall effect
                settled: ch.is_control(),
            });
        }
    }
    targets
}

/// Word-wrap to the given width; words longer than a line are split into
/// hyphenated chunks.
fn wrap_message(message: &str, width: usize) -> Vec<String> {
    let chunk = width.saturating_sub(2).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in message.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > chunk {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                let end = (i + chunk).min(chars.len());
                let mut fragment: String = chars[i..end].iter().collect();
                if end < chars.len() {
                    fragment.push('-');
                }
                lines.push(fragment);
                i = end;
            }
            continue;
        }

        let sep = if current_len > 0 { 1 } else { 0 };
        if current_len + sep + word_len <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_len += sep + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pick which targets animate. Under the cap every unsettled target does;
/// above it an even per-line sample animates and the rest settle at
/// creation. Deterministic, so the final layout is unaffected.
fn select_animated(targets: &mut [TargetCell]) -> Vec<usize> {
    let candidates: Vec<usize> = targets
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.settled)
        .map(|(i, _)| i)
        .collect();
    if candidates.len() <= MAX_ANIMATED_TARGETS {
        return candidates;
    }

    let mut by_line: BTreeMap<u16, Vec<usize>> = BTreeMap::new();
    for &i in &candidates {
        by_line.entry(targets[i].y).or_default().push(i);
    }
    let quota = (MAX_ANIMATED_TARGETS / by_line.len()).max(5);

    let mut selected = Vec::new();
    for row in by_line.values() {
        if row.len() <= quota {
            selected.extend_from_slice(row);
        } else {
            for k in 0..quota {
                selected.push(row[k * row.len() / quota]);
            }
        }
        if selected.len() >= MAX_ANIMATED_TARGETS {
            break;
        }
    }

    let chosen: HashSet<usize> = selected.iter().copied().collect();
    for &i in &candidates {
        if !chosen.contains(&i) {
            targets[i].settled = true;
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(message: &str, width: u16, height: u16, seed: u64) -> RevealAnimator {
        RevealAnimator::with_rng(message, width, height, SmallRng::seed_from_u64(seed))
    }

    fn run_to_completion(animator: &mut RevealAnimator) {
        for _ in 0..10_000 {
            if animator.tick(Instant::now()) {
                return;
            }
        }
        panic!("animation did not finish within 10k frames");
    }

    #[test]
    fn empty_message_finishes_in_zero_frames() {
        let animator = seeded("", 80, 24, 1);
        assert!(animator.is_finished());
        assert!(animator.targets().is_empty());
    }

    #[test]
    fn whitespace_only_message_finishes_immediately() {
        let animator = seeded("   \n\t  ", 80, 24, 1);
        assert!(animator.is_finished());
        assert!(animator.targets().is_empty());
    }

    #[test]
    fn hi_produces_exactly_two_targets() {
        let animator = seeded("Hi", 80, 24, 1);
        assert_eq!(animator.targets().len(), 2);
        assert!(!animator.is_finished());
    }

    #[test]
    fn every_character_settles_in_place() {
        let mut animator = seeded("the quick brown fox", 80, 24, 7);
        run_to_completion(&mut animator);
        assert_eq!(animator.settled_text(), "thequickbrownfox");
    }

    #[test]
    fn resting_layout_ignores_the_rng() {
        let a = seeded("follow the white rabbit", 80, 24, 1);
        let b = seeded("follow the white rabbit", 80, 24, 99);
        let coords = |anim: &RevealAnimator| {
            anim.targets()
                .iter()
                .map(|t| (t.ch, t.x, t.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(coords(&a), coords(&b));
    }

    #[test]
    fn deadline_settles_everything_at_once() {
        let mut animator = seeded("there is no spoon", 80, 24, 3);
        assert!(animator.tick(Instant::now() + MAX_ANIMATION_TIME));
        assert!(animator.targets().iter().all(|t| t.settled));
        assert!(animator.is_finished());
        // Subsequent ticks are no-ops
        assert!(animator.tick(Instant::now()));
    }

    #[test]
    fn long_messages_are_truncated_to_the_viewport() {
        let long = "word ".repeat(2000);
        let animator = seeded(&long, 80, 24, 5);
        let rows: HashSet<u16> = animator.targets().iter().map(|t| t.y).collect();
        assert!(rows.len() <= MAX_VISIBLE_LINES);
        for t in animator.targets() {
            assert!(t.x < 80);
            assert!(t.y < 24);
        }
    }

    #[test]
    fn oversized_messages_presettle_beyond_the_animation_cap() {
        let long = "word ".repeat(2000);
        let animator = seeded(&long, 80, 24, 5);
        let animated = animator.targets().iter().filter(|t| !t.settled).count();
        assert!(animated <= MAX_ANIMATED_TARGETS + MAX_ANIMATED_TARGETS / MAX_VISIBLE_LINES);
        assert!(animated > 0);
    }

    #[test]
    fn tiny_viewport_degrades_without_panicking() {
        let animator = seeded("Hello world", 1, 24, 2);
        for t in animator.targets() {
            assert!(t.x < 1);
        }
        let mut animator = seeded("Hello world", 12, 6, 2);
        run_to_completion(&mut animator);
    }

    #[test]
    fn control_characters_settle_at_creation() {
        let animator = seeded("a\u{7}b", 80, 24, 4);
        let bell = animator
            .targets()
            .iter()
            .find(|t| t.ch == '\u{7}')
            .expect("control character should get a cell");
        assert!(bell.settled);
    }

    #[test]
    fn long_words_wrap_with_hyphens() {
        let lines = wrap_message("abcdefghij", 6);
        assert_eq!(lines, vec!["abcd-", "efgh-", "ij"]);
    }

    #[test]
    fn words_pack_onto_lines_up_to_the_width() {
        let lines = wrap_message("one two three", 7);
        assert_eq!(lines, vec!["one two", "three"]);
    }
}
