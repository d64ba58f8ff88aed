use bonsaigotchi::sim::rng::seeded;
use bonsaigotchi::sim::{CareAction, Creature, FoodItem};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Act(usize),
    Feed(usize),
    Tick(i64),
    Buy(usize, u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..CareAction::ALL.len()).prop_map(Op::Act),
        (0..FoodItem::ALL.len()).prop_map(Op::Feed),
        (0i64..3000).prop_map(Op::Tick),
        ((0..FoodItem::ALL.len()), 1u32..4).prop_map(|(i, q)| Op::Buy(i, q)),
    ]
}

fn vitals(c: &Creature) -> [u8; 7] {
    [
        c.water(),
        c.health(),
        c.growth(),
        c.energy(),
        c.hunger(),
        c.cleanliness(),
        c.mood(),
    ]
}

proptest! {
    #[test]
    fn vitals_stay_bounded_and_progress_never_regresses(
        seed in any::<u64>(),
        speed in 1u32..50,
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap();
        let mut now = start;
        let mut creature = Creature::new("Prop", start, seeded(seed)).unwrap();
        let mut level = creature.level();
        let mut xp = creature.xp();

        for op in ops {
            match op {
                Op::Act(i) => { creature.perform(CareAction::ALL[i], now); }
                Op::Feed(i) => { creature.feed(FoodItem::ALL[i], now); }
                Op::Tick(seconds) => {
                    now += Duration::seconds(seconds);
                    creature.update(now, speed as f64);
                }
                Op::Buy(i, q) => { let _ = creature.buy_food(FoodItem::ALL[i], q); }
            }
            for value in vitals(&creature) {
                prop_assert!(value <= 100);
            }
            prop_assert!(creature.level() >= level);
            prop_assert!(creature.xp() >= xp);
            prop_assert!(creature.level() >= 1);
            level = creature.level();
            xp = creature.xp();
        }
    }
}
