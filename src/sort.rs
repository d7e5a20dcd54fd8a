//! Sorting visualizer: one bar per column, re-drawn after every pass.
//!
//! The sorter runs as a step machine so the caller decides when to draw and
//! swap, and can stop between any two steps.

use crate::{Canvas, Color};
use clap::ValueEnum;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Bidirectional bubble sort; one step is a forward and a backward pass
    #[default]
    Cocktail,
    /// One step inserts the next element into the sorted prefix
    Insertion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Progress {
    Cocktail { start: usize, end: usize },
    Insertion { next: usize },
    Done,
}

pub struct Sorter {
    data: Vec<u32>,
    progress: Progress,
}

impl Sorter {
    pub fn new(data: Vec<u32>, algorithm: Algorithm) -> Self {
        let progress = match algorithm {
            Algorithm::Cocktail => Progress::Cocktail {
                start: 0,
                end: data.len().saturating_sub(1),
            },
            Algorithm::Insertion => Progress::Insertion { next: 1 },
        };
        Self { data, progress }
    }

    /// `count` bars with random heights in `1..=max_height`.
    pub fn random<R: Rng>(rng: &mut R, count: usize, max_height: u32, algorithm: Algorithm) -> Self {
        let data = (0..count).map(|_| rng.gen_range(1..=max_height.max(1))).collect();
        Self::new(data, algorithm)
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn is_done(&self) -> bool {
        self.progress == Progress::Done
    }

    /// Advance by one visible step. Returns false once sorting has finished.
    pub fn step(&mut self) -> bool {
        self.progress = match self.progress {
            Progress::Cocktail { start, end } => self.cocktail_pass(start, end),
            Progress::Insertion { next } => self.insert(next),
            Progress::Done => Progress::Done,
        };
        !self.is_done()
    }

    fn cocktail_pass(&mut self, start: usize, end: usize) -> Progress {
        let mut swapped = false;
        for i in start..end {
            if self.data[i] > self.data[i + 1] {
                self.data.swap(i, i + 1);
                swapped = true;
            }
        }
        if !swapped {
            return Progress::Done;
        }

        // The largest element is now at `end`.
        let end = end - 1;
        swapped = false;
        for i in (start..end).rev() {
            if self.data[i] > self.data[i + 1] {
                self.data.swap(i, i + 1);
                swapped = true;
            }
        }
        if !swapped {
            return Progress::Done;
        }

        Progress::Cocktail {
            start: start + 1,
            end,
        }
    }

    fn insert(&mut self, next: usize) -> Progress {
        if next >= self.data.len() {
            return Progress::Done;
        }
        let key = self.data[next];
        let mut j = next;
        while j > 0 && self.data[j - 1] > key {
            self.data[j] = self.data[j - 1];
            j -= 1;
        }
        self.data[j] = key;
        if next + 1 >= self.data.len() {
            Progress::Done
        } else {
            Progress::Insertion { next: next + 1 }
        }
    }

    /// Draw every value as a bar growing up from the bottom row.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, bar: Color, background: Color) {
        canvas.fill(background);
        let height = canvas.height() as i32;
        for (x, &value) in self.data.iter().enumerate() {
            let top = height - value as i32;
            for y in top.max(0)..height {
                canvas.set_pixel(x as i32, y, bar);
            }
        }
    }
}
