//! Invite issuance, redemption, and the single-winner races.

use std::sync::Arc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

use guild_service::domain::{BillingTier, InviteCode};
use guild_service::shared::error::AppError;

use crate::common::TestCore;

#[tokio::test]
async fn redemption_moves_the_user_and_decrements_uses() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, bob_solo) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Standard)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, Some(3600), Some(3))
        .await
        .unwrap();

    let redeemed = core
        .service
        .join_with_code(&invite.code, bob.id)
        .await
        .unwrap();

    assert_eq!(redeemed.guild_id, guild.id);
    assert_eq!(redeemed.guild_name, "raiders");
    assert_eq!(redeemed.uses_left, Some(2));

    let bob = core.store.user(bob.id).unwrap();
    assert_eq!(bob.current_guild_id, guild.id);
    assert_eq!(core.store.guild(guild.id).unwrap().member_count, 2);
    assert_eq!(core.store.guild(bob_solo.id).unwrap().member_count, 0);
    core.store.assert_invariants();
}

#[tokio::test]
async fn unlimited_invites_never_decrement() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Standard)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, None)
        .await
        .unwrap();

    let redeemed = core
        .service
        .join_with_code(&invite.code, bob.id)
        .await
        .unwrap();
    assert_eq!(redeemed.uses_left, None);
}

#[tokio::test]
async fn only_members_can_issue_invites() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let err = core
        .service
        .create_invite(guild.id, bob.id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn solo_guilds_never_take_invites() {
    let core = TestCore::new();
    let (alice, alice_solo) = core.register("alice").await;

    let err = core
        .service
        .create_invite(alice_solo.id, alice.id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn issuance_against_a_full_guild_is_rejected() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, None)
        .await
        .unwrap();
    core.service.join_with_code(&invite.code, bob.id).await.unwrap();

    // Free tier holds 2; the guild is now full.
    let err = core
        .service
        .create_invite(guild.id, alice.id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded));
}

#[tokio::test]
async fn nonpositive_ttl_or_uses_fail_validation() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let err = core
        .service
        .create_invite(guild.id, alice.id, Some(0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = core
        .service
        .create_invite(guild.id, alice.id, None, Some(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn unknown_codes_are_invalid() {
    let core = TestCore::new();
    let (bob, _) = core.register("bob").await;

    let err = core
        .service
        .join_with_code("NoSuchCode", bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCode));
}

#[tokio::test]
async fn expired_codes_are_rejected_and_consume_nothing() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, bob_solo) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let mut invite = InviteCode::new(guild.id, alice.id, None, Some(5));
    invite.expires_at = Some(Utc::now() - Duration::seconds(1));
    core.store.plant_invite(invite.clone());

    let err = core
        .service
        .join_with_code(&invite.code, bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Expired));

    let stored = core.store.invite(&invite.code).unwrap();
    assert_eq!(stored.uses_left, Some(5));
    assert_eq!(core.store.user(bob.id).unwrap().current_guild_id, bob_solo.id);
}

#[tokio::test]
async fn exhausted_codes_stay_exhausted() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;
    let (carol, carol_solo) = core.register("carol").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Standard)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, Some(1))
        .await
        .unwrap();

    let redeemed = core
        .service
        .join_with_code(&invite.code, bob.id)
        .await
        .unwrap();
    assert_eq!(redeemed.uses_left, Some(0));

    let err = core
        .service
        .join_with_code(&invite.code, carol.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Exhausted));
    assert_eq!(
        core.store.user(carol.id).unwrap().current_guild_id,
        carol_solo.id
    );
    core.store.assert_invariants();
}

#[tokio::test]
async fn redeeming_into_the_current_guild_is_already_member() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, Some(2))
        .await
        .unwrap();

    let err = core
        .service
        .join_with_code(&invite.code, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyMember));

    // Failed redemption burns no use.
    let stored = core.store.invite(&invite.code).unwrap();
    assert_eq!(stored.uses_left, Some(2));
}

#[tokio::test]
async fn redemption_against_a_full_guild_is_limit_exceeded() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;
    let (carol, _) = core.register("carol").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, Some(5))
        .await
        .unwrap();
    core.service.join_with_code(&invite.code, bob.id).await.unwrap();

    let err = core
        .service
        .join_with_code(&invite.code, carol.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded));

    // The slot check failed, so the use was not consumed.
    let stored = core.store.invite(&invite.code).unwrap();
    assert_eq!(stored.uses_left, Some(4));
    core.store.assert_invariants();
}

#[tokio::test]
async fn listing_invites_is_member_only() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();
    core.service
        .create_invite(guild.id, alice.id, None, None)
        .await
        .unwrap();

    let listed = core.service.guild_invites(guild.id, alice.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let err = core
        .service
        .guild_invites(guild.id, bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn preview_reports_redeemability_without_consuming() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Standard)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, Some(3600), Some(1))
        .await
        .unwrap();

    let previewed = core.service.preview_invite(&invite.code).await.unwrap();
    assert_eq!(previewed.code, invite.code);
    assert_eq!(previewed.uses_left, Some(1));

    // Previewing is free; the use is still there for the actual join.
    core.service.join_with_code(&invite.code, bob.id).await.unwrap();

    let err = core.service.preview_invite(&invite.code).await.unwrap_err();
    assert!(matches!(err, AppError::Exhausted));

    let err = core.service.preview_invite("NoSuchCode").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCode));

    let mut stale = InviteCode::new(guild.id, alice.id, None, None);
    stale.expires_at = Some(Utc::now() - Duration::seconds(1));
    core.store.plant_invite(stale.clone());
    let err = core.service.preview_invite(&stale.code).await.unwrap_err();
    assert!(matches!(err, AppError::Expired));
}

#[tokio::test]
async fn sweep_removes_only_expired_codes() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let live = core
        .service
        .create_invite(guild.id, alice.id, Some(3600), None)
        .await
        .unwrap();
    let mut dead = InviteCode::new(guild.id, alice.id, None, None);
    dead.expires_at = Some(Utc::now() - Duration::minutes(5));
    core.store.plant_invite(dead.clone());

    let purged = core.service.sweep_expired_invites().await.unwrap();
    assert_eq!(purged, 1);
    assert!(core.store.invite(&dead.code).is_none());
    assert!(core.store.invite(&live.code).is_some());
}

#[tokio::test]
async fn racing_redemptions_of_the_last_use_yield_one_winner() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;
    let (carol, _) = core.register("carol").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Standard)
        .await
        .unwrap();
    let invite = core
        .service
        .create_invite(guild.id, alice.id, None, Some(1))
        .await
        .unwrap();

    let (s1, s2) = (Arc::clone(&core.service), Arc::clone(&core.service));
    let (c1, c2) = (invite.code.clone(), invite.code.clone());
    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { s1.join_with_code(&c1, bob.id).await }),
        tokio::spawn(async move { s2.join_with_code(&c2, carol.id).await }),
    );
    let outcomes = [r1.unwrap(), r2.unwrap()];

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one racing redemption may consume the last use");
    let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(loser, Err(AppError::Exhausted)));

    assert_eq!(core.store.invite(&invite.code).unwrap().uses_left, Some(0));
    assert_eq!(core.store.guild(guild.id).unwrap().member_count, 2);
    core.store.assert_invariants();
}
