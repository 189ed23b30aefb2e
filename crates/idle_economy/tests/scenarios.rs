use idle_economy::*;

#[test]
fn test_claims_follow_block_schedule() {
    let mut account = Account::new("0x123", 2);

    let receipt = account.claim(4).unwrap();
    assert_eq!(receipt.elapsed, 2);
    assert_eq!(account.balance(), 20_000);

    let receipt = account.claim(10).unwrap();
    assert_eq!(receipt.elapsed, 6);
    assert_eq!(receipt.accrued, 60_000);
    assert_eq!(account.balance(), 80_000);
}

#[test]
fn test_admin_credit_below_cost_does_not_upgrade() {
    let mut account = Account::new("0x123", 2);
    assert_eq!(account.credit_admin(920_000).unwrap(), 920_000);

    let outcome = account.upgrade(AssetCategory::Crops).unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::Failed {
            category: AssetCategory::Crops,
            reason: DeclineReason::InsufficientPoints,
        }
    );
    assert_eq!(account.balance(), 920_000);
    assert_eq!(account.peek_upgrade_cost(AssetCategory::Crops), 1_000_000);
}

#[test]
fn test_full_driver_schedule() {
    // Created at 2, claims at 4 and 10, credit + upgrade at 11,
    // then claims at 12, 15 and 40.
    let mut account = Account::new("0x123", 2);
    account.claim(4).unwrap();
    account.claim(10).unwrap();

    assert_eq!(account.peek_upgrade_cost(AssetCategory::Crops), 1_000_000);
    account.credit_admin(920_000).unwrap();
    let outcome = account.upgrade(AssetCategory::Crops).unwrap();
    assert_eq!(
        outcome,
        UpgradeOutcome::Succeeded {
            category: AssetCategory::Crops,
            charged_cost: 1_000_000,
            new_rate: 10_100,
            new_cost: 1_100_000,
        }
    );
    assert_eq!(account.balance(), 0);

    account.claim(12).unwrap();
    assert_eq!(account.balance(), 20_200);
    account.claim(15).unwrap();
    assert_eq!(account.balance(), 50_500);
    account.claim(40).unwrap();
    assert_eq!(account.balance(), 303_000);
}

#[test]
fn test_seed_costs_visible_after_creation() {
    let account = Account::new("0x123", 0);
    assert_eq!(account.peek_upgrade_cost(AssetCategory::Crops), 1_000_000);
    assert_eq!(account.peek_upgrade_cost(AssetCategory::Animals), 10_000_000);
    assert_eq!(account.peek_upgrade_cost(AssetCategory::Workers), 15_000_000);
}

#[test]
fn test_upgrade_never_adds_units() {
    let mut account = Account::new("0x123", 0);
    account.credit_admin(100_000_000).unwrap();

    account.upgrade(AssetCategory::Workers).unwrap();
    account.upgrade(AssetCategory::Workers).unwrap();

    let workers = account.line(AssetCategory::Workers);
    assert_eq!(workers.quantity(), 0);
    assert_eq!(workers.level(), 2);
    // 15M -> 22.5M -> 33.75M
    assert_eq!(workers.upgrade_cost(), 33_750_000);
    // 70_000 -> 70_875 -> 71_760
    assert_eq!(workers.production_rate(), 71_760);
    assert_eq!(account.projected_accrual(10).unwrap(), 100_000);
}

#[test]
fn test_independent_accounts_share_nothing() {
    let mut alice = Account::new("alice", 0);
    let mut bob = Account::new("bob", 0);

    alice.credit_admin(1_000_000).unwrap();
    alice.upgrade(AssetCategory::Crops).unwrap();
    bob.claim(5).unwrap();

    assert_eq!(bob.peek_upgrade_cost(AssetCategory::Crops), 1_000_000);
    assert_eq!(alice.balance(), 0);
    assert_eq!(bob.balance(), 50_000);
}

#[test]
fn test_accounts_can_move_across_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            std::thread::spawn(move || {
                let mut account = Account::new(format!("player-{i}"), 0);
                account.claim(10 * (i + 1)).unwrap();
                account.balance()
            })
        })
        .collect();

    let balances: Vec<Points> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(balances, vec![100_000, 200_000, 300_000, 400_000]);
}

#[test]
fn test_registry_round_trip() {
    let admin = OwnerId::new("admin");
    let player = OwnerId::new("0x123");
    let mut registry = PlayerRegistry::new(admin.clone());

    registry.start(player.clone(), 2).unwrap();
    registry.claim(&player, 10).unwrap();
    registry.add_funds(&admin, &player, 920_000).unwrap();

    let outcome = registry.upgrade(&player, "CROPS").unwrap();
    assert!(outcome.is_success());

    let rejected = registry.upgrade(&player, "tractors").unwrap();
    assert_eq!(
        rejected,
        UpgradeOutcome::Rejected {
            reason: RejectReason::UnknownCategory("tractors".into())
        }
    );

    let ppb = registry.account(&player).unwrap().points_per_block().unwrap();
    assert_eq!(ppb.total, 10_100);
}
