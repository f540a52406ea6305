//! End-to-end scenarios across the registry API.

use groupsig::{
    Crl, Error, Gml, GroupKey, MemberKey, Message, SchemeCode, Signature, Sysenv,
};

/// Runs the full join protocol for one member, returning its key.
fn enroll(
    scheme: SchemeCode,
    mgrkey: &groupsig::ManagerKey,
    grpkey: &GroupKey,
    gml: &mut Gml,
    rng: &mut Sysenv,
) -> MemberKey {
    let mut memkey = MemberKey::new(scheme).unwrap();
    let steps = scheme.join_seq().unwrap();

    let mut msg = groupsig::join_mgr(0, mgrkey, grpkey, gml, None, rng).unwrap();
    let mut seq = 1;
    loop {
        let out = groupsig::join_mem(seq, &mut memkey, grpkey, &msg, rng).unwrap();
        match out {
            Some(reply) if seq < steps => {
                msg = groupsig::join_mgr(seq + 1, mgrkey, grpkey, gml, Some(&reply), rng)
                    .unwrap();
                seq += 2;
            }
            _ => break,
        }
    }
    memkey
}

fn composite(scope: &str, message: &str) -> Message {
    Message::new(format!(
        r#"{{"scope":"{}","message":"{}"}}"#,
        scope, message
    ))
}

#[test]
fn s1_bbs04_happy_path() {
    let mut rng = Sysenv::from_seed(101);
    let mut grpkey = GroupKey::new(SchemeCode::Bbs04).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Bbs04);

    let mut memkey = enroll(SchemeCode::Bbs04, &mgrkey, &grpkey, &mut gml, &mut rng);

    let msg = Message::new(&b"hello"[..]);
    let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();
    assert!(groupsig::verify(&sig, &msg, &grpkey).unwrap());

    let opened = groupsig::open(&sig, &mgrkey, &grpkey, &gml, &mut rng)
        .unwrap()
        .unwrap();
    assert_eq!(opened.id.index, 0);
    assert!(opened.proof.is_none());
}

#[test]
fn s2_ps16_opening_proof() {
    let mut rng = Sysenv::from_seed(102);
    let mut grpkey = GroupKey::new(SchemeCode::Ps16).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Ps16);

    let _m0 = enroll(SchemeCode::Ps16, &mgrkey, &grpkey, &mut gml, &mut rng);
    let _m1 = enroll(SchemeCode::Ps16, &mgrkey, &grpkey, &mut gml, &mut rng);
    let mut m2 = enroll(SchemeCode::Ps16, &mgrkey, &grpkey, &mut gml, &mut rng);

    let msg = Message::new(&b"audit"[..]);
    let sig = groupsig::sign(&msg, &mut m2, &grpkey, &mut rng).unwrap();
    assert!(groupsig::verify(&sig, &msg, &grpkey).unwrap());

    let opened = groupsig::open(&sig, &mgrkey, &grpkey, &gml, &mut rng)
        .unwrap()
        .unwrap();
    assert_eq!(opened.id.index, 2);

    let proof = opened.proof.unwrap();
    assert!(groupsig::open_verify(&proof, &sig, &grpkey).unwrap());

    // flipping one byte of the proof must break it; the low byte of the
    // response keeps the scalar canonical, so the tampered proof still
    // parses and must then be rejected
    let mut bytes = proof.to_bytes();
    let pos = bytes.len() - 32;
    bytes[pos] ^= 0x01;
    let tampered = groupsig::Proof::from_bytes(&bytes).unwrap();
    assert!(!groupsig::open_verify(&tampered, &sig, &grpkey).unwrap());
}

#[test]
fn s3_klap20_setup_staging() {
    let mut rng = Sysenv::from_seed(103);
    let mut grpkey = GroupKey::new(SchemeCode::Klap20).unwrap();

    let issuer = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    {
        let GroupKey::Klap20(inner) = &grpkey else {
            panic!("scheme changed under us");
        };
        assert!(inner.g.is_some());
        assert!(inner.zz0.is_none());
        assert!(inner.zz1.is_none());
    }

    let opener = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    {
        let GroupKey::Klap20(inner) = &grpkey else {
            panic!("scheme changed under us");
        };
        assert!(inner.zz0.is_some());
        assert!(inner.zz1.is_some());
    }

    assert!(matches!(
        groupsig::setup(&mut grpkey, &mut rng),
        Err(Error::SetupComplete)
    ));

    // and the split keys drive a full lifecycle
    let mut gml = Gml::new(SchemeCode::Klap20);
    let mut memkey = enroll(SchemeCode::Klap20, &issuer, &grpkey, &mut gml, &mut rng);
    let msg = Message::new(&b"staged"[..]);
    let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();
    assert!(groupsig::verify(&sig, &msg, &grpkey).unwrap());

    let opened = groupsig::open(&sig, &opener, &grpkey, &gml, &mut rng)
        .unwrap()
        .unwrap();
    assert_eq!(opened.id.index, 0);
    assert!(groupsig::open_verify(&opened.proof.unwrap(), &sig, &grpkey).unwrap());
}

#[test]
fn s4_dl21_linkage() {
    let mut rng = Sysenv::from_seed(104);
    let mut grpkey = GroupKey::new(SchemeCode::Dl21).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Dl21);

    let mut memkey = enroll(SchemeCode::Dl21, &mgrkey, &grpkey, &mut gml, &mut rng);

    let m1 = composite("svc-A", "m1");
    let m2 = composite("svc-A", "m2");
    let s1 = groupsig::sign(&m1, &mut memkey, &grpkey, &mut rng).unwrap();
    let s2 = groupsig::sign(&m2, &mut memkey, &grpkey, &mut rng).unwrap();

    let bind = composite("svc-A", "link");
    let sigs = vec![s1.clone(), s2];
    let msgs = vec![m1.clone(), m2];
    let proof = groupsig::link(&memkey, &grpkey, &bind, &sigs, &msgs, &mut rng)
        .unwrap()
        .unwrap();
    assert!(groupsig::verify_link(&proof, &grpkey, &bind, &sigs, &msgs).unwrap());

    // the same member under another scope does not link
    let mb = composite("svc-B", "m3");
    let sb = groupsig::sign(&mb, &mut memkey, &grpkey, &mut rng).unwrap();
    let cross_sigs = vec![s1, sb];
    let cross_msgs = vec![m1, mb];
    assert!(
        !groupsig::verify_link(&proof, &grpkey, &bind, &cross_sigs, &cross_msgs).unwrap()
    );
}

#[test]
fn s5_wire_interop() {
    let mut rng = Sysenv::from_seed(105);
    let mut grpkey = GroupKey::new(SchemeCode::Ps16).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Ps16);
    let mut memkey = enroll(SchemeCode::Ps16, &mgrkey, &grpkey, &mut gml, &mut rng);

    let msg = Message::new(&b"wire"[..]);
    let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();

    let bytes = sig.to_bytes();
    assert_eq!(bytes[0], 4);
    assert_eq!(sig.size(), bytes.len());

    let back = Signature::from_bytes(&bytes).unwrap();
    assert_eq!(back, sig);
    assert!(groupsig::verify(&back, &msg, &grpkey).unwrap());
}

#[test]
fn s6_signature_mutations() {
    let mut rng = Sysenv::from_seed(106);
    let mut grpkey = GroupKey::new(SchemeCode::Ps16).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Ps16);
    let mut memkey = enroll(SchemeCode::Ps16, &mgrkey, &grpkey, &mut gml, &mut rng);

    let msg = Message::new(&b"mutate"[..]);
    let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();
    let bytes = sig.to_bytes();

    // the scheme byte: recognized-but-different codes must fail as errors,
    // never as a clean reject
    let mut foreign = bytes.clone();
    foreign[0] = SchemeCode::Bbs04.code();
    assert!(Signature::from_bytes(&foreign).is_err());
    let mut unknown = bytes.clone();
    unknown[0] = 0x7f;
    assert!(matches!(
        Signature::from_bytes(&unknown),
        Err(Error::UnknownScheme(0x7f))
    ));

    // every other byte: a flip either breaks the encoding (import error)
    // or survives it and must then fail verification
    for i in 1..bytes.len() {
        let mut mutated = bytes.clone();
        mutated[i] ^= 0x01;
        if let Ok(tampered) = Signature::from_bytes(&mutated) {
            assert!(
                !groupsig::verify(&tampered, &msg, &grpkey).unwrap(),
                "byte {} flip verified",
                i
            );
        }
    }
}

#[test]
fn join_protocol_ordering() {
    let mut rng = Sysenv::from_seed(107);
    let mut grpkey = GroupKey::new(SchemeCode::Gl19).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Gl19);

    let msg0 = groupsig::join_mgr(0, &mgrkey, &grpkey, &mut gml, None, &mut rng).unwrap();
    let mut memkey = MemberKey::new(SchemeCode::Gl19).unwrap();

    // step 3 before step 1: the incoming message carries the wrong step tag
    assert!(matches!(
        groupsig::join_mem(3, &mut memkey, &grpkey, &msg0, &mut rng),
        Err(Error::JoinStep { .. })
    ));

    // a foreign-scheme join message is rejected by tag, not by parsing
    let mut other_grpkey = GroupKey::new(SchemeCode::Dl21).unwrap();
    let other_mgrkey = groupsig::setup(&mut other_grpkey, &mut rng).unwrap();
    let mut other_gml = Gml::new(SchemeCode::Dl21);
    let foreign =
        groupsig::join_mgr(0, &other_mgrkey, &other_grpkey, &mut other_gml, None, &mut rng)
            .unwrap();
    assert!(matches!(
        groupsig::join_mem(1, &mut memkey, &grpkey, &foreign, &mut rng),
        Err(Error::SchemeMismatch { .. })
    ));

    // the proper order still works afterwards
    let reply = groupsig::join_mem(1, &mut memkey, &grpkey, &msg0, &mut rng)
        .unwrap()
        .unwrap();
    let issued =
        groupsig::join_mgr(2, &mgrkey, &grpkey, &mut gml, Some(&reply), &mut rng).unwrap();
    assert!(groupsig::join_mem(3, &mut memkey, &grpkey, &issued, &mut rng)
        .unwrap()
        .is_none());
}

#[test]
fn cross_scheme_objects_do_not_mix() {
    let mut rng = Sysenv::from_seed(108);

    let mut bbs_grpkey = GroupKey::new(SchemeCode::Bbs04).unwrap();
    let bbs_mgrkey = groupsig::setup(&mut bbs_grpkey, &mut rng).unwrap();
    let mut bbs_gml = Gml::new(SchemeCode::Bbs04);
    let mut bbs_member = enroll(
        SchemeCode::Bbs04,
        &bbs_mgrkey,
        &bbs_grpkey,
        &mut bbs_gml,
        &mut rng,
    );

    let mut ps_grpkey = GroupKey::new(SchemeCode::Ps16).unwrap();
    let _ps_mgrkey = groupsig::setup(&mut ps_grpkey, &mut rng).unwrap();

    let msg = Message::new(&b"mix"[..]);
    let sig = groupsig::sign(&msg, &mut bbs_member, &bbs_grpkey, &mut rng).unwrap();

    assert!(matches!(
        groupsig::verify(&sig, &msg, &ps_grpkey),
        Err(Error::SchemeMismatch { .. })
    ));
    assert!(matches!(
        groupsig::sign(&msg, &mut bbs_member, &ps_grpkey, &mut rng),
        Err(Error::SchemeMismatch { .. })
    ));
    assert!(matches!(
        groupsig::open(&sig, &bbs_mgrkey, &ps_grpkey, &bbs_gml, &mut rng),
        Err(Error::SchemeMismatch { .. })
    ));
}

#[test]
fn gl19_blind_convert_unblind() {
    let mut rng = Sysenv::from_seed(109);
    let mut grpkey = GroupKey::new(SchemeCode::Gl19).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Gl19);

    let mut m0 = enroll(SchemeCode::Gl19, &mgrkey, &grpkey, &mut gml, &mut rng);
    let mut m1 = enroll(SchemeCode::Gl19, &mgrkey, &grpkey, &mut gml, &mut rng);

    let consumer = groupsig::blind_key_gen(&grpkey, &mut rng).unwrap();
    let public = consumer.public();

    let ma = Message::new(&b"a"[..]);
    let mb = Message::new(&b"b"[..]);
    let s0a = groupsig::sign(&ma, &mut m0, &grpkey, &mut rng).unwrap();
    let s0b = groupsig::sign(&mb, &mut m0, &grpkey, &mut rng).unwrap();
    let s1 = groupsig::sign(&ma, &mut m1, &grpkey, &mut rng).unwrap();

    let batch = vec![
        groupsig::blind(&public, &s0a, &ma, &grpkey, &mut rng).unwrap(),
        groupsig::blind(&public, &s0b, &mb, &grpkey, &mut rng).unwrap(),
        groupsig::blind(&public, &s1, &ma, &grpkey, &mut rng).unwrap(),
    ];
    let converted = groupsig::convert(batch, &mgrkey, &grpkey, &public, &mut rng).unwrap();

    let t0a = groupsig::unblind(&consumer, &converted[0]).unwrap();
    let t0b = groupsig::unblind(&consumer, &converted[1]).unwrap();
    let t1 = groupsig::unblind(&consumer, &converted[2]).unwrap();

    assert_eq!(t0a.nym, t0b.nym);
    assert_ne!(t0a.nym, t1.nym);

    // GL19 has no opener
    assert!(matches!(
        groupsig::open(&s0a, &mgrkey, &grpkey, &gml, &mut rng),
        Err(Error::Unsupported { .. })
    ));
}

#[test]
fn unsupported_operations_are_clean_errors() {
    let mut rng = Sysenv::from_seed(110);
    let mut grpkey = GroupKey::new(SchemeCode::Bbs04).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Bbs04);
    let mut memkey = enroll(SchemeCode::Bbs04, &mgrkey, &grpkey, &mut gml, &mut rng);

    let msg = Message::new(&b"x"[..]);
    let sig = groupsig::sign(&msg, &mut memkey, &grpkey, &mut rng).unwrap();

    assert!(matches!(
        groupsig::claim(&sig, &memkey, &grpkey, &mut rng),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        groupsig::prove_equality(&memkey, &[sig.clone()], &mut rng),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        groupsig::identify(&sig, &memkey, &msg),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        groupsig::blind_key_gen(&grpkey, &mut rng),
        Err(Error::Unsupported { .. })
    ));
}

#[test]
fn bbs04_revocation_via_crl() {
    let mut rng = Sysenv::from_seed(111);
    let mut grpkey = GroupKey::new(SchemeCode::Bbs04).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Bbs04);

    let mut m0 = enroll(SchemeCode::Bbs04, &mgrkey, &grpkey, &mut gml, &mut rng);
    let mut m1 = enroll(SchemeCode::Bbs04, &mgrkey, &grpkey, &mut gml, &mut rng);

    let mut crl = Crl::new(SchemeCode::Bbs04);
    let trapdoor = groupsig::reveal(0, &gml, &mut crl).unwrap();
    assert_eq!(trapdoor.scheme(), SchemeCode::Bbs04);

    let msg = Message::new(&b"r"[..]);
    let s0 = groupsig::sign(&msg, &mut m0, &grpkey, &mut rng).unwrap();
    let s1 = groupsig::sign(&msg, &mut m1, &grpkey, &mut rng).unwrap();

    assert!(groupsig::trace(&s0, &mgrkey, &grpkey, &crl).unwrap());
    assert!(!groupsig::trace(&s1, &mgrkey, &grpkey, &crl).unwrap());
}

#[test]
fn dl21seq_sequential_linkage() {
    let mut rng = Sysenv::from_seed(112);
    let mut grpkey = GroupKey::new(SchemeCode::Dl21Seq).unwrap();
    let mgrkey = groupsig::setup(&mut grpkey, &mut rng).unwrap();
    let mut gml = Gml::new(SchemeCode::Dl21Seq);

    let mut memkey = enroll(SchemeCode::Dl21Seq, &mgrkey, &grpkey, &mut gml, &mut rng);

    let m0 = composite("svc-A", "m0");
    let m1 = composite("svc-A", "m1");
    let s0 = groupsig::sign(&m0, &mut memkey, &grpkey, &mut rng).unwrap();
    let s1 = groupsig::sign(&m1, &mut memkey, &grpkey, &mut rng).unwrap();

    let bind = composite("svc-A", "link");
    let sigs = vec![s0, s1];
    let msgs = vec![m0, m1];
    let proof = groupsig::link(&memkey, &grpkey, &bind, &sigs, &msgs, &mut rng)
        .unwrap()
        .unwrap();
    assert!(groupsig::verify_link(&proof, &grpkey, &bind, &sigs, &msgs).unwrap());

    // reversing the order of presentation breaks the sequence check
    let rev_sigs = vec![sigs[1].clone(), sigs[0].clone()];
    let rev_msgs = vec![msgs[1].clone(), msgs[0].clone()];
    assert!(!groupsig::verify_link(&proof, &grpkey, &bind, &rev_sigs, &rev_msgs).unwrap());
}
