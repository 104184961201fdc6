use crate::hdl::statement::{Assign, Statement};
use indexmap::IndexSet;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Shape {
    pub width: u32,
    pub signed: bool,
}

impl Shape {
    pub const fn unsigned(width: u32) -> Shape {
        Shape { width, signed: false }
    }

    pub const fn signed(width: u32) -> Shape {
        Shape { width, signed: true }
    }

    /// The shape of an unsigned integer that can hold every value in `0..count`.
    pub fn for_range(count: u64) -> Shape {
        let max = count.saturating_sub(1);
        Shape::unsigned(u64::BITS - max.leading_zeros())
    }
}

/// The number of bits required to represent `value`,
/// including a sign bit for zero and negative values.
pub fn bits_for(value: &BigInt) -> u32 {
    let bits = if value.is_positive() {
        value.bits()
    } else {
        let magnitude = -value;
        let bits = if magnitude.is_zero() {
            0
        } else {
            (magnitude - BigInt::one()).bits()
        };
        bits + 1
    };
    bits as u32
}

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(0);

/// A named storage element. Clones refer to the same signal, equality and hashing use the signal identity.
#[derive(Clone)]
pub struct Signal(Arc<SignalInfo>);

#[derive(Debug)]
pub struct SignalInfo {
    pub id: u64,
    pub name: String,
    pub shape: Shape,
    pub init: BigInt,
    /// Display names for values of this signal, indexed by value.
    pub decoder: Option<Vec<String>>,
}

impl Signal {
    pub fn new(name: impl Into<String>, shape: Shape) -> Signal {
        Signal::new_with_init(name, shape, 0)
    }

    pub fn new_with_init(name: impl Into<String>, shape: Shape, init: impl Into<BigInt>) -> Signal {
        Signal::new_impl(name.into(), shape, init.into(), None)
    }

    pub fn new_decoded(name: impl Into<String>, shape: Shape, init: impl Into<BigInt>, decoder: Vec<String>) -> Signal {
        Signal::new_impl(name.into(), shape, init.into(), Some(decoder))
    }

    fn new_impl(name: String, shape: Shape, init: BigInt, decoder: Option<Vec<String>>) -> Signal {
        let id = NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed);
        Signal(Arc::new(SignalInfo {
            id,
            name,
            shape,
            init,
            decoder,
        }))
    }

    pub fn info(&self) -> &SignalInfo {
        &self.0
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn shape(&self) -> Shape {
        self.0.shape
    }

    pub fn width(&self) -> u32 {
        self.0.shape.width
    }

    pub fn init(&self) -> &BigInt {
        &self.0.init
    }

    pub fn decoder(&self) -> Option<&[String]> {
        self.0.decoder.as_deref()
    }

    pub fn assign(&self, rhs: impl Into<Value>) -> Statement {
        Value::from(self).assign(rhs)
    }
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Signal {}

impl Hash for Signal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state)
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(sig {})", self.0.name)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Const {
    value: BigInt,
    shape: Shape,
}

impl Const {
    /// Create a constant, wrapping `value` into the range representable by `shape`.
    pub fn new(value: impl Into<BigInt>, shape: Shape) -> Const {
        let value = value.into();
        let Shape { width, signed } = shape;

        let modulus = BigInt::one() << width;
        let mut wrapped = value & (&modulus - BigInt::one());
        if signed && width > 0 && wrapped.bit(u64::from(width) - 1) {
            wrapped -= modulus;
        }

        Const { value: wrapped, shape }
    }

    /// Create a constant with the smallest shape that can hold `value`.
    pub fn cast(value: impl Into<BigInt>) -> Const {
        let value = value.into();
        let shape = Shape {
            width: bits_for(&value),
            signed: value.is_negative(),
        };
        Const { value, shape }
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The bit pattern of this constant, as a non-negative integer.
    pub fn unsigned_bits(&self) -> BigInt {
        let mask = (BigInt::one() << self.shape.width) - BigInt::one();
        &self.value & mask
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::Display)]
pub enum Operator {
    /// Reduce to a single bit, true if any bit is set.
    #[strum(serialize = "b")]
    Bool,
    #[strum(serialize = "~")]
    Not,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Value {
    Const(Const),
    Signal(Signal),
    Operator(Operator, Vec<Value>),
    /// Concatenation, the first part ends up in the least significant bits.
    Cat(Vec<Value>),
    Slice {
        value: Box<Value>,
        start: u32,
        end: u32,
    },
}

impl Value {
    pub fn shape(&self) -> Shape {
        match self {
            Value::Const(c) => c.shape(),
            Value::Signal(s) => s.shape(),
            Value::Operator(op, operands) => match op {
                Operator::Bool | Operator::Eq | Operator::Ne => Shape::unsigned(1),
                Operator::Not => operands.first().map_or(Shape::unsigned(0), Value::shape),
                Operator::And | Operator::Or | Operator::Xor => {
                    let shapes = operands.iter().map(Value::shape);
                    let width = shapes.clone().map(|s| s.width).max().unwrap_or(0);
                    let signed = !operands.is_empty() && shapes.clone().all(|s| s.signed);
                    Shape { width, signed }
                }
            },
            Value::Cat(parts) => Shape::unsigned(parts.iter().map(Value::width).sum()),
            &Value::Slice { value: _, start, end } => Shape::unsigned(end - start),
        }
    }

    pub fn width(&self) -> u32 {
        self.shape().width
    }

    /// Reduce this value to a single bit that is set if any bit of the value is set.
    /// Single-bit values are returned unchanged.
    pub fn as_bool(&self) -> Value {
        if self.width() == 1 {
            self.clone()
        } else {
            Value::Operator(Operator::Bool, vec![self.clone()])
        }
    }

    /// Try to evaluate this value as a constant.
    pub fn as_const(&self) -> Option<Const> {
        match self {
            Value::Const(c) => Some(c.clone()),
            Value::Signal(_) | Value::Operator(_, _) => None,
            Value::Cat(parts) => {
                let mut result = BigInt::zero();
                let mut offset = 0;
                for part in parts {
                    let part = part.as_const()?;
                    result |= part.unsigned_bits() << offset;
                    offset += part.shape().width;
                }
                Some(Const::new(result, Shape::unsigned(offset)))
            }
            &Value::Slice { ref value, start, end } => {
                let inner = value.as_const()?;
                Some(Const::new(inner.unsigned_bits() >> start, Shape::unsigned(end - start)))
            }
        }
    }

    pub fn cat(parts: impl IntoIterator<Item = Value>) -> Value {
        Value::Cat(parts.into_iter().collect())
    }

    pub fn equals(&self, rhs: impl Into<Value>) -> Value {
        Value::Operator(Operator::Eq, vec![self.clone(), rhs.into()])
    }

    pub fn not_equals(&self, rhs: impl Into<Value>) -> Value {
        Value::Operator(Operator::Ne, vec![self.clone(), rhs.into()])
    }

    pub fn not(&self) -> Value {
        Value::Operator(Operator::Not, vec![self.clone()])
    }

    pub fn and(&self, rhs: impl Into<Value>) -> Value {
        Value::Operator(Operator::And, vec![self.clone(), rhs.into()])
    }

    pub fn or(&self, rhs: impl Into<Value>) -> Value {
        Value::Operator(Operator::Or, vec![self.clone(), rhs.into()])
    }

    pub fn xor(&self, rhs: impl Into<Value>) -> Value {
        Value::Operator(Operator::Xor, vec![self.clone(), rhs.into()])
    }

    pub fn slice(&self, start: u32, end: u32) -> Value {
        assert!(
            start <= end && end <= self.width(),
            "invalid slice {}..{} of value with width {}",
            start,
            end,
            self.width()
        );
        Value::Slice {
            value: Box::new(self.clone()),
            start,
            end,
        }
    }

    pub fn assign(self, rhs: impl Into<Value>) -> Statement {
        Statement::Assign(Assign {
            lhs: self,
            rhs: rhs.into(),
        })
    }

    /// The signals that would be written if this value were the target of an assignment.
    pub fn lhs_signals(&self) -> IndexSet<Signal> {
        let mut result = IndexSet::new();
        self.collect_lhs_signals(&mut result);
        result
    }

    fn collect_lhs_signals(&self, result: &mut IndexSet<Signal>) {
        match self {
            Value::Signal(s) => {
                result.insert(s.clone());
            }
            Value::Cat(parts) => parts.iter().for_each(|p| p.collect_lhs_signals(result)),
            Value::Slice { value, .. } => value.collect_lhs_signals(result),
            Value::Const(_) | Value::Operator(_, _) => {}
        }
    }
}

impl From<Signal> for Value {
    fn from(value: Signal) -> Self {
        Value::Signal(value)
    }
}

impl From<&Signal> for Value {
    fn from(value: &Signal) -> Self {
        Value::Signal(value.clone())
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl From<Const> for Value {
    fn from(value: Const) -> Self {
        Value::Const(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Const(Const::new(u8::from(value), Shape::unsigned(1)))
    }
}

macro_rules! impl_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Const(Const::cast(value))
                }
            }
        )*
    };
}

impl_value_from_int!(i32, u32, i64, u64, usize, BigInt);

#[cfg(test)]
mod test {
    use crate::hdl::value::{bits_for, Const, Shape, Signal, Value};
    use num_bigint::BigInt;

    #[test]
    fn bits_for_matches_signed_and_unsigned_widths() {
        let cases = [(0, 1), (1, 1), (2, 2), (3, 2), (4, 3), (255, 8), (-1, 1), (-2, 2), (-3, 3), (-4, 3), (-5, 4)];
        for (value, expected) in cases {
            assert_eq!(bits_for(&BigInt::from(value)), expected, "bits_for({})", value);
        }
    }

    #[test]
    fn shape_for_range() {
        assert_eq!(Shape::for_range(0), Shape::unsigned(0));
        assert_eq!(Shape::for_range(1), Shape::unsigned(0));
        assert_eq!(Shape::for_range(2), Shape::unsigned(1));
        assert_eq!(Shape::for_range(3), Shape::unsigned(2));
        assert_eq!(Shape::for_range(4), Shape::unsigned(2));
        assert_eq!(Shape::for_range(5), Shape::unsigned(3));
    }

    #[test]
    fn const_wraps_into_shape() {
        assert_eq!(Const::new(5, Shape::unsigned(2)).value(), &BigInt::from(1));
        assert_eq!(Const::new(3, Shape::signed(2)).value(), &BigInt::from(-1));
        assert_eq!(Const::new(-1, Shape::unsigned(3)).value(), &BigInt::from(7));
    }

    #[test]
    fn cat_of_consts_is_const() {
        let value = Value::cat([
            Value::Const(Const::new(1, Shape::unsigned(1))),
            Value::Const(Const::new(2, Shape::unsigned(2))),
        ]);
        let c = value.as_const().unwrap();
        assert_eq!(c.shape(), Shape::unsigned(3));
        assert_eq!(c.value(), &BigInt::from(0b101));
    }

    #[test]
    fn signal_is_not_const() {
        let s = Signal::new("s", Shape::unsigned(4));
        assert_eq!(Value::from(&s).as_const(), None);
        assert_eq!(Value::from(&s).slice(0, 2).width(), 2);
    }

    #[test]
    fn as_bool_only_reduces_wide_values() {
        let a = Signal::new("a", Shape::unsigned(1));
        let b = Signal::new("b", Shape::unsigned(3));
        assert_eq!(Value::from(&a).as_bool(), Value::from(&a));
        assert_eq!(Value::from(&b).as_bool().width(), 1);
        assert_ne!(Value::from(&b).as_bool(), Value::from(&b));
    }

    #[test]
    fn signal_identity() {
        let a0 = Signal::new("a", Shape::unsigned(1));
        let a1 = Signal::new("a", Shape::unsigned(1));
        assert_ne!(a0, a1);
        assert_eq!(a0, a0.clone());
    }

    #[test]
    fn lhs_signals_of_cat_and_slice() {
        let a = Signal::new("a", Shape::unsigned(2));
        let b = Signal::new("b", Shape::unsigned(2));
        let lhs = Value::cat([Value::from(&a).slice(0, 1), Value::from(&b), Value::from(&a)]);
        let signals: Vec<Signal> = lhs.lhs_signals().into_iter().collect();
        assert_eq!(signals, vec![a, b]);
    }
}
