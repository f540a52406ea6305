use crate::group::{Element, Encodable, EncodingError, PairingCurve as PC, Point, Scalar as Sc};
use ark_bls12_381 as bls381;
use ark_ec::hashing::curve_maps::wb::WBMap;
use ark_ec::hashing::map_to_curve_hasher::MapToCurveBasedHasher;
use ark_ec::hashing::{HashToCurve, HashToCurveError};
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::field_hashers::DefaultFieldHasher;
use ark_ff::{Field, One, PrimeField, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use rand_core::RngCore;
use serde::{
    de::{Error as DeserializeError, SeqAccess, Visitor},
    ser::{Error as SerializationError, SerializeTuple},
    Deserialize, Deserializer, Serialize, Serializer,
};
use sha2::Sha256;
use std::{
    fmt,
    marker::PhantomData,
    ops::{AddAssign, MulAssign, Neg, SubAssign},
};

/// Domain separator for hashing messages and scope strings to the curve.
pub const MAP_DOMAIN: &[u8] = b"GROUPSIG-BLS12381-H2C";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub struct Scalar(
    #[serde(deserialize_with = "deserialize_field")]
    #[serde(serialize_with = "serialize_field")]
    <bls381::Bls12_381 as Pairing>::ScalarField,
);

type ZG1 = <bls381::Bls12_381 as Pairing>::G1;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct G1(
    #[serde(deserialize_with = "deserialize_group")]
    #[serde(serialize_with = "serialize_group")]
    ZG1,
);

type ZG2 = <bls381::Bls12_381 as Pairing>::G2;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct G2(
    #[serde(deserialize_with = "deserialize_group")]
    #[serde(serialize_with = "serialize_group")]
    ZG2,
);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GT(
    #[serde(deserialize_with = "deserialize_field")]
    #[serde(serialize_with = "serialize_field")]
    <bls381::Bls12_381 as Pairing>::TargetField,
);

impl Element for Scalar {
    type RHS = Scalar;

    fn new() -> Self {
        Self(Zero::zero())
    }

    fn one() -> Self {
        Self(One::one())
    }

    fn add(&mut self, s2: &Self) {
        self.0.add_assign(s2.0);
    }

    fn mul(&mut self, mul: &Scalar) {
        self.0.mul_assign(mul.0)
    }

    fn negate(&mut self) {
        *self = Self(self.0.neg())
    }

    fn rand<R: RngCore>(rng: &mut R) -> Self {
        Self(bls381::Fr::rand(rng))
    }
}

impl Sc for Scalar {
    fn set_int(&mut self, i: u64) {
        *self = Self(bls381::Fr::from(i))
    }

    fn inverse(&self) -> Option<Self> {
        Some(Self(Field::inverse(&self.0)?))
    }

    fn sub(&mut self, other: &Self) {
        self.0.sub_assign(other.0);
    }

    fn from_random_bytes(bytes: &[u8]) -> Option<Self> {
        let fr = bls381::Fr::from_random_bytes(bytes)?;
        Some(Self(fr))
    }

    fn from_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(bls381::Fr::from_le_bytes_mod_order(bytes))
    }
}

impl Encodable for Scalar {
    fn marshal_len() -> usize {
        bls381::Fr::zero().serialized_size(Compress::Yes)
    }

    fn marshal(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::marshal_len());
        self.0
            .serialize_compressed(&mut bytes)
            .expect("writing to a Vec never fails");
        bytes
    }

    fn unmarshal(&mut self, data: &[u8]) -> Result<(), EncodingError> {
        if data.len() != Self::marshal_len() {
            return Err(EncodingError::Length {
                want: Self::marshal_len(),
                got: data.len(),
            });
        }
        let fr = bls381::Fr::deserialize_with_mode(&mut &data[..], Compress::Yes, Validate::Yes)
            .map_err(|_| EncodingError::InvalidElement)?;
        self.0 = fr;
        Ok(())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:?}}}", self.0)
    }
}

/// G1 points can be multiplied by Fr elements
impl Element for G1 {
    type RHS = Scalar;

    fn new() -> Self {
        Self(Zero::zero())
    }

    fn one() -> Self {
        Self(ZG1::generator())
    }

    fn rand<R: RngCore>(rng: &mut R) -> Self {
        Self(ZG1::rand(rng))
    }

    fn add(&mut self, s2: &Self) {
        self.0.add_assign(s2.0);
    }

    fn mul(&mut self, mul: &Scalar) {
        self.0.mul_assign(mul.0);
    }

    fn negate(&mut self) {
        self.0 = self.0.neg();
    }
}

impl Point for G1 {
    type Error = HashToCurveError;

    fn map(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let hasher = MapToCurveBasedHasher::<
            ZG1,
            DefaultFieldHasher<Sha256>,
            WBMap<bls381::g1::Config>,
        >::new(MAP_DOMAIN)?;

        let hash = hasher.hash(data)?;

        *self = Self(hash.into());

        Ok(())
    }
}

impl Encodable for G1 {
    fn marshal_len() -> usize {
        ZG1::zero().into_affine().serialized_size(Compress::Yes)
    }

    fn marshal(&self) -> Vec<u8> {
        let affine = self.0.into_affine();
        let mut bytes = Vec::with_capacity(Self::marshal_len());
        affine
            .serialize_compressed(&mut bytes)
            .expect("writing to a Vec never fails");
        bytes
    }

    fn unmarshal(&mut self, data: &[u8]) -> Result<(), EncodingError> {
        if data.len() != Self::marshal_len() {
            return Err(EncodingError::Length {
                want: Self::marshal_len(),
                got: data.len(),
            });
        }
        let affine = bls381::G1Affine::deserialize_with_mode(
            &mut &data[..],
            Compress::Yes,
            Validate::Yes,
        )
        .map_err(|_| EncodingError::InvalidElement)?;
        self.0 = affine.into();
        Ok(())
    }
}

impl fmt::Display for G1 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:?}}}", self.0)
    }
}

/// G2 points can be multiplied by Fr elements
impl Element for G2 {
    type RHS = Scalar;

    fn new() -> Self {
        Self(Zero::zero())
    }

    fn one() -> Self {
        Self(ZG2::generator())
    }

    fn rand<R: RngCore>(mut rng: &mut R) -> Self {
        Self(ZG2::rand(&mut rng))
    }

    fn add(&mut self, s2: &Self) {
        self.0.add_assign(s2.0);
    }

    fn mul(&mut self, mul: &Scalar) {
        self.0.mul_assign(mul.0)
    }

    fn negate(&mut self) {
        self.0 = self.0.neg();
    }
}

impl Point for G2 {
    type Error = HashToCurveError;

    fn map(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let hasher = MapToCurveBasedHasher::<
            ZG2,
            DefaultFieldHasher<Sha256>,
            WBMap<bls381::g2::Config>,
        >::new(MAP_DOMAIN)?;

        let hash = hasher.hash(data)?;
        *self = Self(hash.into());

        Ok(())
    }
}

impl Encodable for G2 {
    fn marshal_len() -> usize {
        ZG2::zero().into_affine().serialized_size(Compress::Yes)
    }

    fn marshal(&self) -> Vec<u8> {
        let affine = self.0.into_affine();
        let mut bytes = Vec::with_capacity(Self::marshal_len());
        affine
            .serialize_compressed(&mut bytes)
            .expect("writing to a Vec never fails");
        bytes
    }

    fn unmarshal(&mut self, data: &[u8]) -> Result<(), EncodingError> {
        if data.len() != Self::marshal_len() {
            return Err(EncodingError::Length {
                want: Self::marshal_len(),
                got: data.len(),
            });
        }
        let affine = bls381::G2Affine::deserialize_with_mode(
            &mut &data[..],
            Compress::Yes,
            Validate::Yes,
        )
        .map_err(|_| EncodingError::InvalidElement)?;
        self.0 = affine.into();
        Ok(())
    }
}

impl fmt::Display for G2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:?}}}", self.0)
    }
}

/// GT is the multiplicative target group of the pairing. It reuses the
/// additive trait vocabulary: `add` multiplies and `mul` exponentiates.
impl Element for GT {
    type RHS = Scalar;

    fn new() -> Self {
        Self(One::one())
    }

    fn one() -> Self {
        Self(One::one())
    }

    fn add(&mut self, s2: &Self) {
        self.0.mul_assign(s2.0);
    }

    fn mul(&mut self, mul: &Scalar) {
        self.0 = self.0.pow(mul.0.into_bigint());
    }

    fn negate(&mut self) {
        if let Some(inv) = self.0.inverse() {
            self.0 = inv;
        }
    }

    fn rand<R: RngCore>(rng: &mut R) -> Self {
        Self(bls381::Fq12::rand(rng))
    }
}

impl Encodable for GT {
    fn marshal_len() -> usize {
        bls381::Fq12::one().serialized_size(Compress::Yes)
    }

    fn marshal(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::marshal_len());
        self.0
            .serialize_compressed(&mut bytes)
            .expect("writing to a Vec never fails");
        bytes
    }

    fn unmarshal(&mut self, data: &[u8]) -> Result<(), EncodingError> {
        if data.len() != Self::marshal_len() {
            return Err(EncodingError::Length {
                want: Self::marshal_len(),
                got: data.len(),
            });
        }
        let e = bls381::Fq12::deserialize_with_mode(&mut &data[..], Compress::Yes, Validate::Yes)
            .map_err(|_| EncodingError::InvalidElement)?;
        self.0 = e;
        Ok(())
    }
}

impl fmt::Display for GT {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:?}}}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct PairingCurve;

impl PC for PairingCurve {
    type Scalar = Scalar;
    type G1 = G1;
    type G2 = G2;
    type GT = GT;

    fn pair(a: &Self::G1, b: &Self::G2) -> Self::GT {
        GT(<bls381::Bls12_381 as Pairing>::pairing(a.0, b.0).0)
    }
}

// Fixed-size serde implementations so bincode produces exactly the
// canonical encodings.

fn deserialize_field<'de, D, C>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: Field,
{
    struct FieldVisitor<C>(PhantomData<C>);

    impl<'de, C> Visitor<'de> for FieldVisitor<C>
    where
        C: Field,
    {
        type Value = C;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a valid group element")
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<C, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let len = C::zero().serialized_size(Compress::Yes);
            let bytes: Vec<u8> = (0..len)
                .map(|_| {
                    seq.next_element()?
                        .ok_or_else(|| DeserializeError::custom("could not read bytes"))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let res =
                C::deserialize_compressed(&mut &bytes[..]).map_err(DeserializeError::custom)?;
            Ok(res)
        }
    }

    let visitor = FieldVisitor(PhantomData);
    deserializer.deserialize_tuple(C::zero().serialized_size(Compress::Yes), visitor)
}

fn serialize_field<S, C>(c: &C, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    C: Field,
{
    let len = c.serialized_size(Compress::Yes);
    let mut bytes = Vec::with_capacity(len);
    c.serialize_compressed(&mut bytes)
        .map_err(SerializationError::custom)?;

    let mut tup = s.serialize_tuple(len)?;
    for byte in &bytes {
        tup.serialize_element(byte)?;
    }
    tup.end()
}

fn deserialize_group<'de, D, C>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: CurveGroup,
    C::Affine: CanonicalDeserialize + CanonicalSerialize,
{
    struct GroupVisitor<C>(PhantomData<C>);

    impl<'de, C> Visitor<'de> for GroupVisitor<C>
    where
        C: CurveGroup,
    {
        type Value = C;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a valid group element")
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<C, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let len = C::Affine::zero().serialized_size(Compress::Yes);
            let bytes: Vec<u8> = (0..len)
                .map(|_| {
                    seq.next_element()?
                        .ok_or_else(|| DeserializeError::custom("could not read bytes"))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let affine = C::Affine::deserialize_compressed(&mut &bytes[..])
                .map_err(DeserializeError::custom)?;
            Ok(affine.into())
        }
    }

    let visitor = GroupVisitor(PhantomData);
    deserializer.deserialize_tuple(C::Affine::zero().serialized_size(Compress::Yes), visitor)
}

fn serialize_group<S, C>(c: &C, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    C: CurveGroup,
    C::Affine: CanonicalSerialize,
{
    let affine = c.into_affine();
    let len = affine.serialized_size(Compress::Yes);
    let mut bytes = Vec::with_capacity(len);
    affine
        .serialize_compressed(&mut bytes)
        .map_err(SerializationError::custom)?;

    let mut tup = s.serialize_tuple(len)?;
    for byte in &bytes {
        tup.serialize_element(byte)?;
    }
    tup.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{PairingCurve as _, Point as _};
    use serde::de::DeserializeOwned;
    use static_assertions::assert_impl_all;

    assert_impl_all!(G1: Serialize, DeserializeOwned, Clone);
    assert_impl_all!(G2: Serialize, DeserializeOwned, Clone);
    assert_impl_all!(GT: Serialize, DeserializeOwned, Clone);
    assert_impl_all!(Scalar: Serialize, DeserializeOwned, Clone);

    #[test]
    fn canonical_sizes() {
        assert_eq!(Scalar::marshal_len(), 32);
        assert_eq!(G1::marshal_len(), 48);
        assert_eq!(G2::marshal_len(), 96);
        assert_eq!(GT::marshal_len(), 576);
    }

    #[test]
    fn marshal_roundtrip() {
        marshal_roundtrip_test::<Scalar>();
        marshal_roundtrip_test::<G1>();
        marshal_roundtrip_test::<G2>();
    }

    fn marshal_roundtrip_test<E: Element>() {
        let rng = &mut rand::thread_rng();
        let e = E::rand(rng);
        let bytes = e.marshal();
        assert_eq!(bytes.len(), E::marshal_len());

        let mut de = E::new();
        de.unmarshal(&bytes).unwrap();
        assert_eq!(de, e);
    }

    #[test]
    fn serde_matches_marshal() {
        let rng = &mut rand::thread_rng();
        let p = G1::rand(rng);
        let ser = bincode::serialize(&p).unwrap();
        assert_eq!(ser, p.marshal());

        let de: G1 = bincode::deserialize(&ser).unwrap();
        assert_eq!(de, p);
    }

    #[test]
    fn unmarshal_rejects_garbage() {
        let mut p = G1::new();
        assert!(p.unmarshal(&[0u8; 47]).is_err());
        assert!(p.unmarshal(&[0xffu8; 48]).is_err());
    }

    #[test]
    fn pairing_bilinear() {
        let rng = &mut rand::thread_rng();
        let a = Scalar::rand(rng);
        let b = Scalar::rand(rng);

        let mut ga = G1::one();
        ga.mul(&a);
        let mut gb = G2::one();
        gb.mul(&b);

        // e(aP, bQ) == e(P, Q)^{ab}
        let left = PairingCurve::pair(&ga, &gb);
        let mut right = PairingCurve::pair(&G1::one(), &G2::one());
        let mut ab = a;
        ab.mul(&b);
        right.mul(&ab);
        assert_eq!(left, right);
    }

    #[test]
    fn gt_exp() {
        let rng = &mut rand::thread_rng();
        let base = GT::rand(rng);

        let mut sc = Scalar::one();
        sc.add(&Scalar::one());
        sc.add(&Scalar::one());

        let mut exp = base.clone();
        exp.mul(&sc);

        let mut res = base.clone();
        res.add(&base);
        res.add(&base);

        assert_eq!(exp, res);
    }

    #[test]
    fn map_to_curve_deterministic() {
        let mut p = G1::new();
        p.map(b"some scope").unwrap();
        let mut q = G1::new();
        q.map(b"some scope").unwrap();
        assert_eq!(p, q);

        let mut r = G1::new();
        r.map(b"other scope").unwrap();
        assert_ne!(p, r);
    }
}
