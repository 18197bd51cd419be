/*
    Arithmetic on the secp256k1 elliptic curve.

        y^2 = x^3 + ax + b  (mod p)

    Points are affine coordinates or the point at infinity.
    Scalar multiplication runs in jacobian coordinates internally
    so only one modular inversion is needed per multiplication.

    Reference:
        https://www.secg.org/sec2-v2.pdf
*/

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;
use secp256k1::constants::{CURVE_ORDER, FIELD_SIZE, GENERATOR_X, GENERATOR_Y};

use crate::{
    error::{Error, Result},
    util::bytes_to_int
};

/**
    Domain parameters of the curve.
*/
#[derive(Debug)]
pub struct Curve {
    pub p: BigInt,
    pub a: BigInt,
    pub b: BigInt,
    pub n: BigInt,
    pub h: BigInt,
    pub g: Point
}

pub static CURVE: Lazy<Curve> = Lazy::new(|| Curve {
    p: bytes_to_int(&FIELD_SIZE),
    a: BigInt::zero(),
    b: BigInt::from(7),
    n: bytes_to_int(&CURVE_ORDER),
    h: BigInt::one(),
    g: Point::Coordinates(bytes_to_int(&GENERATOR_X), bytes_to_int(&GENERATOR_Y))
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity,
    Coordinates(BigInt, BigInt)
}

impl Point {
    /**
        Creates an affine point, failing if it does not lie on the curve.
    */
    pub fn new(x: BigInt, y: BigInt) -> Result<Self> {
        let point = Point::Coordinates(x, y);
        if !on_curve(&point) { return Err(Error::NotOnCurve) }
        Ok(point)
    }

    pub fn generator() -> Self {
        CURVE.g.clone()
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    pub fn x(&self) -> Option<&BigInt> {
        match self {
            Point::Coordinates(x, _) => Some(x),
            Point::Infinity => None
        }
    }

    pub fn y(&self) -> Option<&BigInt> {
        match self {
            Point::Coordinates(_, y) => Some(y),
            Point::Infinity => None
        }
    }

    pub fn add(&self, other: &Point) -> Point {
        point_add(self, other)
    }

    pub fn negate(&self) -> Point {
        negate(self)
    }

    pub fn multiply(&self, k: &BigInt) -> Point {
        point_multiply(k, self)
    }
}

/**
    Inverse of a modulo n through the extended euclidean algorithm.
    Returns None when a and n are not coprime.
*/
pub fn modular_inverse(a: &BigInt, n: &BigInt) -> Option<BigInt> {
    if n.is_zero() { return None }

    let (mut old_r, mut r) = (a.mod_floor(n), n.abs());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = old_r.div_floor(&r);
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if old_r.is_one() { Some(old_s.mod_floor(n)) } else { None }
}

pub fn on_curve(point: &Point) -> bool {
    match point {
        Point::Infinity => true,
        Point::Coordinates(x, y) => {
            let c = &*CURVE;
            if x.is_negative() || y.is_negative() || *x >= c.p || *y >= c.p { return false }
            (y * y - x * x * x - &c.a * x - &c.b).mod_floor(&c.p).is_zero()
        }
    }
}

pub fn negate(point: &Point) -> Point {
    match point {
        Point::Infinity => Point::Infinity,
        Point::Coordinates(x, y) => Point::Coordinates(x.clone(), (-y).mod_floor(&CURVE.p))
    }
}

/**
    Group law on affine points.
*/
pub fn point_add(p: &Point, q: &Point) -> Point {
    let (x1, y1, x2, y2) = match (p, q) {
        (Point::Infinity, _) => return q.clone(),
        (_, Point::Infinity) => return p.clone(),
        (Point::Coordinates(x1, y1), Point::Coordinates(x2, y2)) => (x1, y1, x2, y2)
    };
    let prime = &CURVE.p;

    let (numerator, denominator) = if (x1 - x2).mod_floor(prime).is_zero() {
        if (y1 + y2).mod_floor(prime).is_zero() {
            return Point::Infinity
        }
        // Doubling
        (BigInt::from(3) * x1 * x1 + &CURVE.a, BigInt::from(2) * y1)
    } else {
        (y2 - y1, x2 - x1)
    };

    // p is prime, only a vertical line has no inverse
    let slope = match modular_inverse(&denominator, prime) {
        Some(inverse) => numerator * inverse,
        None => return Point::Infinity
    };

    let x3 = (&slope * &slope - x1 - x2).mod_floor(prime);
    let y3 = (slope * (x1 - &x3) - y1).mod_floor(prime);
    let result = Point::Coordinates(x3, y3);

    debug_assert!(on_curve(&result));
    result
}

/**
    Scalar multiplication k * point.
*/
pub fn point_multiply(k: &BigInt, point: &Point) -> Point {
    let n = &CURVE.n;
    if k.mod_floor(n).is_zero() || point.is_infinity() {
        return Point::Infinity
    }
    if k.is_negative() {
        return point_multiply(&-k, &negate(point))
    }

    let k = k.mod_floor(n);
    let base = Jacobian::from_affine(point);
    let mut acc = Jacobian::infinity();
    for i in (0..k.bits()).rev() {
        acc = acc.double();
        if k.bit(i) {
            acc = acc.add(&base);
        }
    }

    let result = acc.to_affine();
    debug_assert!(on_curve(&result));
    result
}

/**
    Recovers the y coordinate for x with the requested parity.
    Works because p = 3 mod 4.
*/
pub fn get_y(x: &BigInt, even: bool) -> Result<BigInt> {
    let c = &*CURVE;
    let y_squared = (x * x * x + &c.a * x + &c.b).mod_floor(&c.p);
    let exponent: BigInt = (&c.p + 1u32) / 4u32;
    let mut y = y_squared.modpow(&exponent, &c.p);

    if (&y * &y).mod_floor(&c.p) != y_squared { return Err(Error::NotOnCurve) }
    if y.is_even() != even && !y.is_zero() {
        y = &c.p - y;
    }
    Ok(y)
}

/// (X, Y, Z) representing (X/Z^2, Y/Z^3). Z = 0 is infinity.
#[derive(Debug, Clone)]
struct Jacobian {
    x: BigInt,
    y: BigInt,
    z: BigInt
}

impl Jacobian {
    fn infinity() -> Self {
        Jacobian { x: BigInt::one(), y: BigInt::one(), z: BigInt::zero() }
    }

    fn from_affine(point: &Point) -> Self {
        match point {
            Point::Infinity => Self::infinity(),
            Point::Coordinates(x, y) => Jacobian { x: x.clone(), y: y.clone(), z: BigInt::one() }
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn to_affine(&self) -> Point {
        let p = &CURVE.p;
        let z_inv = match modular_inverse(&self.z, p) {
            Some(z_inv) => z_inv,
            // Z = 0 mod p
            None => return Point::Infinity
        };
        let z_inv2 = (&z_inv * &z_inv).mod_floor(p);
        let x = (&self.x * &z_inv2).mod_floor(p);
        let y = (&self.y * z_inv2 * z_inv).mod_floor(p);
        Point::Coordinates(x, y)
    }

    // a = 0 for secp256k1
    fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() { return Self::infinity() }
        let p = &CURVE.p;

        let y2 = (&self.y * &self.y).mod_floor(p);
        let s = (BigInt::from(4) * &self.x * &y2).mod_floor(p);
        let m = (BigInt::from(3) * &self.x * &self.x).mod_floor(p);
        let x3 = (&m * &m - BigInt::from(2) * &s).mod_floor(p);
        let y3 = (m * (s - &x3) - BigInt::from(8) * &y2 * &y2).mod_floor(p);
        let z3 = (BigInt::from(2) * &self.y * &self.z).mod_floor(p);
        Jacobian { x: x3, y: y3, z: z3 }
    }

    fn add(&self, other: &Jacobian) -> Self {
        if self.is_infinity() { return other.clone() }
        if other.is_infinity() { return self.clone() }
        let p = &CURVE.p;

        let z1z1 = (&self.z * &self.z).mod_floor(p);
        let z2z2 = (&other.z * &other.z).mod_floor(p);
        let u1 = (&self.x * &z2z2).mod_floor(p);
        let u2 = (&other.x * &z1z1).mod_floor(p);
        let s1 = (&self.y * &other.z * &z2z2).mod_floor(p);
        let s2 = (&other.y * &self.z * &z1z1).mod_floor(p);

        if u1 == u2 {
            return if s1 == s2 { self.double() } else { Self::infinity() }
        }

        let h = (&u2 - &u1).mod_floor(p);
        let r = (&s2 - &s1).mod_floor(p);
        let h2 = (&h * &h).mod_floor(p);
        let h3 = (&h2 * &h).mod_floor(p);
        let u1h2 = (&u1 * &h2).mod_floor(p);

        let x3 = (&r * &r - &h3 - BigInt::from(2) * &u1h2).mod_floor(p);
        let y3 = (r * (u1h2 - &x3) - s1 * h3).mod_floor(p);
        let z3 = (h * &self.z * &other.z).mod_floor(p);
        Jacobian { x: x3, y: y3, z: z3 }
    }
}
