use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Index, Mul, Sub};

use num::{Num, Zero};

use crate::geometry::{Vector2, Vector3};

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point2<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T) -> Point2<T> {
        Point2 { x, y }
    }
}

impl<T> Add<Vector2<T>> for Point2<T>
where
    T: Num + Copy,
{
    type Output = Point2<T>;
    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T> Sub for Point2<T>
where
    T: Num + Copy,
{
    type Output = Vector2<T>;
    fn sub(self, rhs: Point2<T>) -> Vector2<T> {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("invalid index into 2-point: {}", i),
        }
    }
}

impl<T> Display for Point2<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Point3<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T, z: T) -> Point3<T> {
        Point3 { x, y, z }
    }

    pub fn to_vector(&self) -> Vector3<T> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl Point3<f32> {
    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        (*self - *p).length()
    }

    pub fn distance_squared(&self, p: &Point3<f32>) -> f32 {
        (*self - *p).length_squared()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T> Zero for Point3<T>
where
    T: Num + Copy,
{
    fn zero() -> Point3<T> {
        Point3::new(T::zero(), T::zero(), T::zero())
    }

    fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}

impl<T> Add for Point3<T>
where
    T: Num + Copy,
{
    type Output = Point3<T>;
    fn add(self, rhs: Point3<T>) -> Point3<T> {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T> Add<Vector3<T>> for Point3<T>
where
    T: Num + Copy,
{
    type Output = Point3<T>;
    fn add(self, rhs: Vector3<T>) -> Point3<T> {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T> Sub for Point3<T>
where
    T: Num + Copy,
{
    type Output = Vector3<T>;
    fn sub(self, rhs: Point3<T>) -> Vector3<T> {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T> Sub<Vector3<T>> for Point3<T>
where
    T: Num + Copy,
{
    type Output = Point3<T>;
    fn sub(self, rhs: Vector3<T>) -> Point3<T> {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T> Mul<T> for Point3<T>
where
    T: Num + Copy,
{
    type Output = Point3<T>;
    fn mul(self, rhs: T) -> Point3<T> {
        Point3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("invalid index into 3-point: {}", i),
        }
    }
}

impl<T> Display for Point3<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
