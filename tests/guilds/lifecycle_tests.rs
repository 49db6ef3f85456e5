//! User provisioning, guild creation, and deletion with evictions.

use pretty_assertions::assert_eq;

use guild_service::domain::BillingTier;
use guild_service::shared::error::AppError;

use crate::common::TestCore;

#[tokio::test]
async fn registration_provisions_a_solo_guild() {
    let core = TestCore::new();
    let (alice, solo) = core.register("alice").await;

    assert!(solo.is_solo);
    assert_eq!(solo.member_limit, 1);
    assert_eq!(solo.member_count, 1);
    assert_eq!(solo.creator_id, alice.id);
    assert_eq!(solo.name, "alice's guild");
    assert_eq!(alice.current_guild_id, solo.id);
    assert_eq!(alice.solo_guild_id, solo.id);
    core.store.assert_invariants();
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let core = TestCore::new();
    core.register("alice").await;

    let err = core.service.register_user("alice").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn created_guilds_take_their_limit_from_the_tier() {
    let core = TestCore::new();
    let (alice, solo) = core.register("alice").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Premium)
        .await
        .unwrap();

    assert_eq!(guild.member_limit, 100);
    assert_eq!(guild.member_count, 1);
    assert_eq!(guild.creator_id, alice.id);
    assert!(!guild.is_solo);

    // Creation switches the creator in, so the solo guild empties out.
    let alice = core.store.user(alice.id).unwrap();
    assert_eq!(alice.current_guild_id, guild.id);
    assert_eq!(core.store.guild(solo.id).unwrap().member_count, 0);
    core.store.assert_invariants();
}

#[tokio::test]
async fn free_tier_is_the_default_and_holds_two() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::default())
        .await
        .unwrap();
    assert_eq!(guild.billing_tier, BillingTier::Free);
    assert_eq!(guild.member_limit, 2);
}

#[tokio::test]
async fn solo_guilds_are_never_deletable() {
    let core = TestCore::new();
    let (alice, alice_solo) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    // Not even the owner, and is_solo wins over the permission check for
    // everyone else too.
    let err = core
        .service
        .delete_guild(alice.id, alice_solo.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotDeletable));

    let err = core
        .service
        .delete_guild(bob.id, alice_solo.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotDeletable));
}

#[tokio::test]
async fn only_the_creator_can_delete() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let guild = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let err = core.service.delete_guild(bob.id, guild.id).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn deleting_an_unknown_guild_is_not_found() {
    let core = TestCore::new();
    let (alice, _) = core.register("alice").await;

    let err = core.service.delete_guild(alice.id, 424242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deletion_evicts_every_member_to_their_solo_guild() {
    let core = TestCore::new();
    let (alice, alice_solo) = core.register("alice").await;
    let (bob, bob_solo) = core.register("bob").await;
    let (carol, carol_solo) = core.register("carol").await;

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
    core.service.join_with_code(&invite.code, bob.id).await.unwrap();
    core.service.join_with_code(&invite.code, carol.id).await.unwrap();
    assert_eq!(core.store.guild(guild.id).unwrap().member_count, 3);

    core.service.delete_guild(alice.id, guild.id).await.unwrap();

    assert!(core.store.guild(guild.id).is_none());
    for (user, solo) in [(alice.id, alice_solo.id), (bob.id, bob_solo.id), (carol.id, carol_solo.id)] {
        assert_eq!(core.store.user(user).unwrap().current_guild_id, solo);
        assert_eq!(core.store.guild(solo).unwrap().member_count, 1);
    }
    core.store.assert_invariants();

    // Outstanding codes die with the guild.
    let (dave, _) = core.register("dave").await;
    let err = core
        .service
        .join_with_code(&invite.code, dave.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCode));
}

#[tokio::test]
async fn members_listing_reflects_current_pointers() {
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

    let members = core.service.guild_members(guild.id).await.unwrap();
    let ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    assert!(ids.contains(&alice.id));
    assert!(ids.contains(&bob.id));
    assert_eq!(members.len(), 2);

    core.service.leave_guild(bob.id).await.unwrap();
    let members = core.service.guild_members(guild.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, alice.id);
}

#[tokio::test]
async fn my_guilds_lists_created_guilds_and_the_solo() {
    let core = TestCore::new();
    let (alice, solo) = core.register("alice").await;
    let (bob, _) = core.register("bob").await;

    let created = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();

    let mut ids: Vec<i64> = core
        .service
        .my_guilds(alice.id)
        .await
        .unwrap()
        .iter()
        .map(|g| g.id)
        .collect();
    ids.sort();
    let mut expected = vec![solo.id, created.id];
    expected.sort();
    assert_eq!(ids, expected);

    // Joining someone else's guild grants membership, not ownership.
    let invite = core
        .service
        .create_invite(created.id, alice.id, None, None)
        .await
        .unwrap();
    core.service.join_with_code(&invite.code, bob.id).await.unwrap();
    let bobs = core.service.my_guilds(bob.id).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert!(bobs[0].is_solo);
}

#[tokio::test]
async fn current_user_returns_the_active_guild() {
    let core = TestCore::new();
    let (alice, solo) = core.register("alice").await;

    let (user, guild) = core.service.current_user(alice.id).await.unwrap();
    assert_eq!(user.id, alice.id);
    assert_eq!(guild.id, solo.id);

    let created = core
        .service
        .create_guild(alice.id, "raiders".into(), BillingTier::Free)
        .await
        .unwrap();
    let (_, guild) = core.service.current_user(alice.id).await.unwrap();
    assert_eq!(guild.id, created.id);
}
