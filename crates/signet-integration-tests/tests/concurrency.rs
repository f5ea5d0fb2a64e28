//! # Concurrent Mutation
//!
//! Many threads share one registry through `Arc`. Every mutation commits
//! atomically, so contended operations neither lose updates nor leave
//! gaps in the journal.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use signet_core::{Identifier, SubjectId};
use signet_crypto::PublicMaterial;
use signet_registry::{RegistrationPolicy, RegistryError, RegistryEvent, SignetRegistry};

const THREADS: usize = 8;
const ROTATIONS_PER_THREAD: usize = 25;

fn shared_registry() -> Arc<SignetRegistry> {
    Arc::new(SignetRegistry::new(Identifier::new("admin"), RegistrationPolicy::Open).unwrap())
}

#[test]
fn concurrent_rotations_lose_no_updates() {
    let reg = shared_registry();
    let s = SubjectId::new("S1").unwrap();
    let owner = Identifier::new("O1");
    reg.register(s.clone(), owner.clone(), PublicMaterial::opaque(b"K0".to_vec()), &owner)
        .unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            let s = s.clone();
            let owner = owner.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..ROTATIONS_PER_THREAD)
                    .map(|i| {
                        let material = PublicMaterial::opaque(format!("K-{t}-{i}").into_bytes());
                        reg.rotate(&s, material, &owner).unwrap().value.version
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut versions = BTreeSet::new();
    for h in handles {
        for v in h.join().unwrap() {
            assert!(versions.insert(v), "version {v} handed out twice");
        }
    }

    let n = (THREADS * ROTATIONS_PER_THREAD) as u64;
    assert_eq!(versions.len() as u64, n);
    assert_eq!(versions.iter().next().copied(), Some(1));
    assert_eq!(versions.iter().last().copied(), Some(n));
    assert_eq!(reg.lookup(&s).unwrap().version, n);

    let rotated: Vec<u64> = reg
        .events()
        .iter()
        .filter_map(|e| match e.event {
            RegistryEvent::Rotated { version, .. } => Some(version),
            _ => None,
        })
        .collect();
    assert_eq!(rotated, (1..=n).collect::<Vec<u64>>());
}

#[test]
fn racing_registrations_have_one_winner() {
    let reg = shared_registry();
    let s = SubjectId::new("contested").unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            let s = s.clone();
            thread::spawn(move || {
                let owner = Identifier::new(format!("O{t}"));
                barrier.wait();
                reg.register(s, owner.clone(), PublicMaterial::opaque(b"K".to_vec()), &owner)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, RegistryError::AlreadyRegistered { .. })));
    assert_eq!(reg.events().len(), 1);
}

#[test]
fn journal_is_gap_free_under_mixed_load() {
    let reg = shared_registry();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let owner = Identifier::new(format!("O{t}"));
                let s = SubjectId::new(format!("S{t}")).unwrap();
                barrier.wait();
                reg.register(s.clone(), owner.clone(), PublicMaterial::opaque(b"K".to_vec()), &owner)
                    .unwrap();
                for i in 0..10 {
                    // Interleave failures with successes.
                    let _ = reg.rotate(&s, PublicMaterial::opaque(Vec::new()), &owner);
                    let _ = reg.rotate(&s, PublicMaterial::opaque(vec![i]), &Identifier::new("intruder"));
                    reg.rotate(&s, PublicMaterial::opaque(vec![i + 1]), &owner).unwrap();
                }
                reg.revoke(&s, &owner).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let events = reg.events();
    assert_eq!(events.len(), THREADS * 12);
    for (i, e) in events.iter().enumerate() {
        assert_eq!(e.sequence.value(), i as u64 + 1);
    }
    assert_eq!(reg.head().value(), events.len() as u64);
}
