//! The arbitrary contract and the parameter arbitraries built on it.
//!
//! An [`Arbitrary`] is an explicit, first-class generator/shrinker/printer
//! triple. Unlike tree-based shrinking, the shrink space is recomputed from a
//! value on demand: `shrink` returns a finite iterator that is restartable
//! (calling it again on the same value reproduces the same candidates, in the
//! same order) and never borrows the value it was derived from.

use crate::data::{Seed, Size};
use std::fmt::Debug;
use std::rc::Rc;

/// A finite, restartable stream of shrink candidates.
pub type Shrinks<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Explicit generator, shrinker and printer for values of one type.
pub trait Arbitrary {
    type Value;

    /// Generate a value using the given size hint and seed.
    fn generate(&self, size: Size, seed: Seed) -> Self::Value;

    /// Candidate simplifications of `value`, simplest-reachable first.
    ///
    /// The stream must be finite, must not yield `value` itself, and calling
    /// this again with an equal value must reproduce the same candidates.
    fn shrink<'a>(&'a self, value: &Self::Value) -> Shrinks<'a, Self::Value>;

    /// Render a value for reports.
    fn show(&self, value: &Self::Value) -> String;
}

impl<A: Arbitrary + ?Sized> Arbitrary for Rc<A> {
    type Value = A::Value;

    fn generate(&self, size: Size, seed: Seed) -> Self::Value {
        (**self).generate(size, seed)
    }

    fn shrink<'a>(&'a self, value: &Self::Value) -> Shrinks<'a, Self::Value> {
        (**self).shrink(value)
    }

    fn show(&self, value: &Self::Value) -> String {
        (**self).show(value)
    }
}

/// Arbitrary that always produces the same value and never shrinks.
#[derive(Debug, Clone)]
pub struct Constant<T> {
    value: T,
}

/// Create a constant arbitrary.
pub fn constant<T: Clone + Debug>(value: T) -> Constant<T> {
    Constant { value }
}

impl<T: Clone + Debug> Arbitrary for Constant<T> {
    type Value = T;

    fn generate(&self, _size: Size, _seed: Seed) -> T {
        self.value.clone()
    }

    fn shrink<'a>(&'a self, _value: &T) -> Shrinks<'a, T> {
        Box::new(std::iter::empty())
    }

    fn show(&self, value: &T) -> String {
        format!("{value:?}")
    }
}

/// Random booleans; `true` shrinks to `false`.
#[derive(Debug, Clone, Copy)]
pub struct Boolean;

pub fn boolean() -> Boolean {
    Boolean
}

impl Arbitrary for Boolean {
    type Value = bool;

    fn generate(&self, _size: Size, seed: Seed) -> bool {
        seed.next_bool().0
    }

    fn shrink<'a>(&'a self, value: &bool) -> Shrinks<'a, bool> {
        if *value {
            Box::new(std::iter::once(false))
        } else {
            Box::new(std::iter::empty())
        }
    }

    fn show(&self, value: &bool) -> String {
        value.to_string()
    }
}

/// Uniform integer in an inclusive range, shrinking toward the lower bound.
#[derive(Debug, Clone, Copy)]
pub struct IntRange {
    min: i32,
    max: i32,
}

/// Create an integer arbitrary over `[min, max]`.
pub fn int_range(min: i32, max: i32) -> IntRange {
    IntRange { min, max }
}

impl Arbitrary for IntRange {
    type Value = i32;

    fn generate(&self, _size: Size, seed: Seed) -> i32 {
        let range = self.max as i64 - self.min as i64 + 1;
        let (value, _) = seed.next_bounded(range as u64);
        (self.min as i64 + value as i64) as i32
    }

    fn shrink<'a>(&'a self, value: &i32) -> Shrinks<'a, i32> {
        Box::new(halving_toward(self.min as i64, *value as i64).map(|v| v as i32))
    }

    fn show(&self, value: &i32) -> String {
        value.to_string()
    }
}

/// Natural numbers up to the current generation size, shrinking toward zero.
#[derive(Debug, Clone, Copy)]
pub struct Nat;

pub fn nat() -> Nat {
    Nat
}

impl Arbitrary for Nat {
    type Value = u32;

    fn generate(&self, size: Size, seed: Seed) -> u32 {
        let (value, _) = seed.next_bounded(size.get() as u64 + 1);
        value as u32
    }

    fn shrink<'a>(&'a self, value: &u32) -> Shrinks<'a, u32> {
        Box::new(halving_toward(0, *value as i64).map(|v| v as u32))
    }

    fn show(&self, value: &u32) -> String {
        value.to_string()
    }
}

/// Candidates `target + d/2, target + d/4, .., target` for `d = value - target`.
///
/// Strictly decreasing distance, so any chain of accepted candidates is finite
/// and ends at `target`.
fn halving_toward(target: i64, value: i64) -> impl Iterator<Item = i64> {
    let mut distance = value - target;
    std::iter::from_fn(move || {
        if distance == 0 {
            return None;
        }
        distance /= 2;
        Some(target + distance)
    })
}

/// Vectors of generated elements.
///
/// Length is uniform in `[0, log2(size + 1)]`; shrinking removes contiguous
/// chunks before simplifying individual elements, per [`shrink_list`].
#[derive(Debug, Clone)]
pub struct VecOf<A> {
    element: Rc<A>,
}

pub fn vec_of<A: Arbitrary>(element: A) -> VecOf<A> {
    VecOf {
        element: Rc::new(element),
    }
}

impl<A> Arbitrary for VecOf<A>
where
    A: Arbitrary + 'static,
    A::Value: Clone + 'static,
{
    type Value = Vec<A::Value>;

    fn generate(&self, size: Size, seed: Seed) -> Vec<A::Value> {
        let max_len = (size.get() as u64 + 1).ilog2() as u64;
        let (len_seed, mut seed) = seed.split();
        let (len, _) = len_seed.next_bounded(max_len + 1);
        (0..len)
            .map(|_| {
                let (elem_seed, rest) = seed.split();
                seed = rest;
                self.element.generate(size, elem_seed)
            })
            .collect()
    }

    fn shrink<'a>(&'a self, value: &Vec<A::Value>) -> Shrinks<'a, Vec<A::Value>> {
        let element = Rc::clone(&self.element);
        shrink_list(
            move |v| -> Shrinks<'static, A::Value> {
                let candidates: Vec<A::Value> = element.shrink(v).collect();
                Box::new(candidates.into_iter())
            },
            value,
        )
    }

    fn show(&self, value: &Vec<A::Value>) -> String {
        let rendered: Vec<String> = value.iter().map(|v| self.element.show(v)).collect();
        format!("[{}]", rendered.join(", "))
    }
}

/// Short lowercase ASCII strings; shrinking only removes characters.
#[derive(Debug, Clone, Copy)]
pub struct AsciiString;

pub fn ascii_string() -> AsciiString {
    AsciiString
}

impl Arbitrary for AsciiString {
    type Value = String;

    fn generate(&self, size: Size, seed: Seed) -> String {
        let max_len = (size.get() as u64 + 1).ilog2() as u64;
        let (len_seed, mut seed) = seed.split();
        let (len, _) = len_seed.next_bounded(max_len + 1);
        (0..len)
            .map(|_| {
                let (char_seed, rest) = seed.split();
                seed = rest;
                let (offset, _) = char_seed.next_bounded(26);
                (b'a' + offset as u8) as char
            })
            .collect()
    }

    fn shrink<'a>(&'a self, value: &String) -> Shrinks<'a, String> {
        let chars: Vec<char> = value.chars().collect();
        Box::new(
            shrink_list(
                |_: &char| -> Shrinks<'static, char> { Box::new(std::iter::empty()) },
                &chars,
            )
            .map(|cs| cs.into_iter().collect()),
        )
    }

    fn show(&self, value: &String) -> String {
        format!("{value:?}")
    }
}

/// The empty parameter set: commands built from no generated values.
impl Arbitrary for () {
    type Value = ();

    fn generate(&self, _size: Size, _seed: Seed) -> () {}

    fn shrink<'a>(&'a self, _value: &()) -> Shrinks<'a, ()> {
        Box::new(std::iter::empty())
    }

    fn show(&self, _value: &()) -> String {
        String::new()
    }
}

// Fixed-arity parameter tuples. Positions generate independently from split
// seeds and shrink one at a time, the others held at their current value;
// positions are never reordered. A single parameter needs no tuple: pass its
// arbitrary directly.
macro_rules! tuple_arbitrary {
    ($($name:ident: $idx:tt),+) => {
        impl<$($name,)+> Arbitrary for ($($name,)+)
        where
            $($name: Arbitrary, $name::Value: Clone + 'static,)+
        {
            type Value = ($($name::Value,)+);

            fn generate(&self, size: Size, seed: Seed) -> Self::Value {
                let mut seed = seed;
                ($(
                    {
                        let (elem_seed, rest) = seed.split();
                        seed = rest;
                        self.$idx.generate(size, elem_seed)
                    },
                )+)
            }

            fn shrink<'a>(&'a self, value: &Self::Value) -> Shrinks<'a, Self::Value> {
                let mut candidates: Shrinks<'a, Self::Value> = Box::new(std::iter::empty());
                $(
                    let fixed = value.clone();
                    let position = self.$idx.shrink(&value.$idx).map(move |shrunk| {
                        let mut candidate = fixed.clone();
                        candidate.$idx = shrunk;
                        candidate
                    });
                    candidates = Box::new(candidates.chain(position));
                )+
                candidates
            }

            fn show(&self, value: &Self::Value) -> String {
                let rendered = [$(self.$idx.show(&value.$idx),)+];
                rendered.join(", ")
            }
        }
    };
}

tuple_arbitrary!(A: 0, B: 1);
tuple_arbitrary!(A: 0, B: 1, C: 2);
tuple_arbitrary!(A: 0, B: 1, C: 2, D: 3);

/// Pair of independently drawn values, shrinking per position.
#[derive(Debug, Clone)]
pub struct PairArbitrary<A, B> {
    first: A,
    second: B,
}

pub fn pair<A, B>(first: A, second: B) -> PairArbitrary<A, B> {
    PairArbitrary { first, second }
}

impl<A, B> Arbitrary for PairArbitrary<A, B>
where
    A: Arbitrary,
    B: Arbitrary,
    A::Value: Clone + 'static,
    B::Value: Clone + 'static,
{
    type Value = (A::Value, B::Value);

    fn generate(&self, size: Size, seed: Seed) -> Self::Value {
        let (first_seed, second_seed) = seed.split();
        (
            self.first.generate(size, first_seed),
            self.second.generate(size, second_seed),
        )
    }

    fn shrink<'a>(&'a self, value: &Self::Value) -> Shrinks<'a, Self::Value> {
        let second_fixed = value.1.clone();
        let firsts = self
            .first
            .shrink(&value.0)
            .map(move |first| (first, second_fixed.clone()));
        let first_fixed = value.0.clone();
        let seconds = self
            .second
            .shrink(&value.1)
            .map(move |second| (first_fixed.clone(), second));
        Box::new(firsts.chain(seconds))
    }

    fn show(&self, value: &Self::Value) -> String {
        format!(
            "({}, {})",
            self.first.show(&value.0),
            self.second.show(&value.1)
        )
    }
}

/// Recursive cut-and-shrink over a list.
///
/// For `[x, xs..]`, candidates are yielded lazily in the order:
/// 1. cuts: `xs[c..]` for offsets `len(xs)/2, len(xs)/4, .., 0` — each drops
///    `x` plus a head-adjacent chunk of `xs`, largest chunk first;
/// 2. head simplification: `[x', xs..]` for each `x'` from `shrink_elem(x)`;
/// 3. recursion on the tail: `[x, xs'..]`.
///
/// The empty list yields nothing. Relative order is always preserved and every
/// candidate is strictly smaller than the input under the (length, element
/// sizes) order, so a chain of accepted candidates always terminates.
pub fn shrink_list<T, F>(shrink_elem: F, items: &[T]) -> Shrinks<'static, Vec<T>>
where
    T: Clone + 'static,
    F: Fn(&T) -> Shrinks<'static, T> + Clone + 'static,
{
    if items.is_empty() {
        return Box::new(std::iter::empty());
    }

    let head = items[0].clone();
    let tail: Vec<T> = items[1..].to_vec();

    let cuts = {
        let tail = tail.clone();
        halving_offsets(tail.len()).map(move |offset| tail[offset..].to_vec())
    };

    let head_shrinks = {
        let head = head.clone();
        let tail = tail.clone();
        let shrink_elem = shrink_elem.clone();
        // Deferred so that shrink_elem only runs if the cuts are exhausted.
        std::iter::once(()).flat_map(move |_| {
            let tail = tail.clone();
            shrink_elem(&head).map(move |shrunk| {
                let mut candidate = Vec::with_capacity(tail.len() + 1);
                candidate.push(shrunk);
                candidate.extend(tail.iter().cloned());
                candidate
            })
        })
    };

    let tail_shrinks = std::iter::once(()).flat_map(move |_| {
        let head = head.clone();
        shrink_list(shrink_elem.clone(), &tail).map(move |mut candidate| {
            candidate.insert(0, head.clone());
            candidate
        })
    });

    Box::new(cuts.chain(head_shrinks).chain(tail_shrinks))
}

/// Cut offsets `len/2, len/4, .., 0`: strictly decreasing, always ending at 0.
fn halving_offsets(len: usize) -> impl Iterator<Item = usize> {
    let mut next = Some(len / 2);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current == 0 { None } else { Some(current / 2) };
        Some(current)
    })
}
