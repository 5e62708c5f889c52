// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use veilstake::core::economics::registry::Pool;
use veilstake::core::economics::service::StakingService;
use veilstake::core::economics::session::StakeRequest;
use veilstake::core::types::{Amount, ParticipantId, PoolId};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn pool() -> Pool {
    Pool {
        id: PoolId::new("001").unwrap(),
        name: "Ethereum Alpha".into(),
        min_stake: Amount::from_whole(1),
        max_capacity: Amount::from_whole(100),
        reward_rate_bps: 820,
    }
}

#[test]
fn commit_line_carries_own_stake_and_rejections_do_not_log_amounts() {
    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    let svc = StakingService::in_memory(vec![pool()]).unwrap();
    let alice = ParticipantId::from_bytes([0xa1; 20]);
    let bob = ParticipantId::from_bytes([0xb2; 20]);

    tracing::subscriber::with_default(subscriber, || {
        svc.stake(StakeRequest {
            pool_id: PoolId::new("001").unwrap(),
            participant: alice,
            amount: Amount::parse_decimal("60.5").unwrap(),
        });
        svc.stake(StakeRequest {
            pool_id: PoolId::new("001").unwrap(),
            participant: bob,
            amount: Amount::from_whole(77),
        });
    });

    let logs = out.text();
    let committed = logs
        .lines()
        .find(|l| l.contains("stake committed"))
        .expect("commit line");
    assert!(committed.contains("own_stake=60.5"), "{committed}");

    let rejected = logs
        .lines()
        .find(|l| l.contains("stake rejected"))
        .expect("rejection line");
    assert!(rejected.contains("capacity_exceeded"), "{rejected}");
    assert!(!rejected.contains("77"), "{rejected}");
}
