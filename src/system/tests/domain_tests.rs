//! Domain-focused tests for descriptors and analysis merging.

use crate::system::domain::{
    AnalysisReport, SystemDescriptor, SystemDomainError, SystemId, SystemKind, SystemName,
    SystemStatus,
};
use mockable::DefaultClock;
use rstest::rstest;

fn descriptor() -> SystemDescriptor {
    SystemDescriptor::new(
        SystemId::new("storefront").expect("valid id"),
        SystemName::new("Storefront").expect("valid name"),
        "/srv/projects/storefront".into(),
        SystemKind::React,
        &DefaultClock,
    )
    .expect("valid descriptor")
}

#[rstest]
#[case("storefront")]
#[case("store-front_2")]
#[case("a")]
fn system_id_accepts_valid_slugs(#[case] value: &str) {
    let id = SystemId::new(value).expect("valid slug");
    assert_eq!(id.as_str(), value);
}

#[rstest]
#[case("", SystemDomainError::EmptySystemId)]
#[case("   ", SystemDomainError::EmptySystemId)]
#[case("Storefront", SystemDomainError::InvalidSystemId("Storefront".to_owned()))]
#[case("store front", SystemDomainError::InvalidSystemId("store front".to_owned()))]
fn system_id_rejects_invalid_values(#[case] value: &str, #[case] expected: SystemDomainError) {
    let result = SystemId::new(value);
    assert_eq!(result, Err(expected));
}

#[rstest]
fn system_id_rejects_overlong_values() {
    let value = "a".repeat(65);
    assert_eq!(
        SystemId::new(value.clone()),
        Err(SystemDomainError::SystemIdTooLong(value))
    );
}

#[rstest]
#[case("My Storefront App", Some("my_storefront_app"))]
#[case("storefront", Some("storefront"))]
#[case("Shop--2.0", Some("shop_2_0"))]
#[case("___", None)]
#[case("", None)]
fn slug_derivation_from_directory_names(#[case] value: &str, #[case] expected: Option<&str>) {
    let slug = SystemId::slug_from(value);
    assert_eq!(slug.as_ref().map(SystemId::as_str), expected);
}

#[rstest]
fn descriptor_requires_an_absolute_path() {
    let result = SystemDescriptor::new(
        SystemId::new("storefront").expect("valid id"),
        SystemName::new("Storefront").expect("valid name"),
        "projects/storefront".into(),
        SystemKind::React,
        &DefaultClock,
    );
    assert_eq!(
        result,
        Err(SystemDomainError::RelativePath(
            "projects/storefront".to_owned()
        ))
    );
}

#[rstest]
fn new_descriptor_needs_setup_until_analysed() {
    let descriptor = descriptor();
    assert_eq!(descriptor.status(), SystemStatus::NeedsSetup);
    assert!(descriptor.last_checked().is_none());
    assert!(!descriptor.status_overridden());
}

#[rstest]
fn apply_analysis_merges_status_and_capabilities() {
    let mut descriptor = descriptor();
    let report = AnalysisReport::new(SystemStatus::Ready, SystemKind::ReactBaas)
        .with_technologies(["React".to_owned(), "Firebase".to_owned()])
        .with_deploy_capable(true)
        .with_built(true);

    descriptor.apply_analysis(&report, &DefaultClock);

    assert_eq!(descriptor.status(), SystemStatus::Ready);
    assert!(descriptor.deploy_capable());
    assert!(descriptor.built());
    assert!(descriptor.technologies().contains("Firebase"));
    assert!(descriptor.last_checked().is_some());
    // The stored kind stays caller-chosen; analysis only suggests.
    assert_eq!(descriptor.kind(), SystemKind::React);
}

#[rstest]
fn status_override_survives_a_normal_analysis() {
    let mut descriptor = descriptor();
    descriptor.override_status(SystemStatus::Maintenance);

    let report = AnalysisReport::new(SystemStatus::Ready, SystemKind::React);
    descriptor.apply_analysis(&report, &DefaultClock);

    assert_eq!(descriptor.status(), SystemStatus::Maintenance);
    assert!(descriptor.status_overridden());
}

#[rstest]
fn error_analysis_takes_precedence_over_an_override() {
    let mut descriptor = descriptor();
    descriptor.override_status(SystemStatus::Active);

    let report = AnalysisReport::error("project path is gone");
    descriptor.apply_analysis(&report, &DefaultClock);

    assert_eq!(descriptor.status(), SystemStatus::Error);
}

#[rstest]
fn cleared_override_restores_the_derived_status_on_next_analysis() {
    let mut descriptor = descriptor();
    descriptor.override_status(SystemStatus::Maintenance);
    descriptor.clear_status_override();

    let report = AnalysisReport::new(SystemStatus::Ready, SystemKind::React);
    descriptor.apply_analysis(&report, &DefaultClock);

    assert_eq!(descriptor.status(), SystemStatus::Ready);
}

#[rstest]
fn system_name_rejects_blank_values() {
    assert_eq!(
        SystemName::new("   "),
        Err(SystemDomainError::EmptySystemName)
    );
}

#[rstest]
#[case(SystemKind::React, "react")]
#[case(SystemKind::ReactBaas, "react_baas")]
#[case(SystemKind::NodeService, "node_service")]
#[case(SystemKind::FullStack, "full_stack")]
#[case(SystemKind::Other, "other")]
fn kind_round_trips_through_its_canonical_form(#[case] kind: SystemKind, #[case] text: &str) {
    assert_eq!(kind.as_str(), text);
    assert_eq!(SystemKind::try_from(text), Ok(kind));
}
