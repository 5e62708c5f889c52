// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use veilstake::core::economics::ledger::StakeLedger;
use veilstake::core::economics::registry::{Pool, PoolRegistry};
use veilstake::core::types::{Amount, ParticipantId, PoolId};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    min: u16,
    cap: u32,
    ops: Vec<(u8, u64)>,
}

fuzz_target!(|inp: Input| {
    let min = Amount::from_base_units(inp.min.max(1) as u128);
    let cap = Amount::from_base_units((inp.cap as u128).max(min.base_units()));
    let Ok(id) = PoolId::new("f") else { return };
    let pool = Pool { id: id.clone(), name: "fuzz".into(), min_stake: min, max_capacity: cap, reward_rate_bps: 0 };
    let Ok(registry) = PoolRegistry::new(vec![pool]) else { return };
    let ledger = StakeLedger::new(Arc::new(registry));

    for (who, units) in inp.ops {
        let p = ParticipantId::from_bytes([who; 20]);
        let _ = ledger.reserve_and_commit(&id, &p, Amount::from_base_units(units as u128));
        if let Ok(t) = ledger.pool_totals(&id) {
            assert!(t.total_staked <= cap);
        }
    }
});
