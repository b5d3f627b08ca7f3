//! Schema 演进：版本偏斜、future data 保全与版本单调性。

mod fixtures;

use fixtures::*;
use strata_core::prelude::*;

/// 旧端（Customer v1）解码新端（v2）数据：未识别的 `loyalty` 字节被保留，
/// 再编码逐字节还原，未知数据经由旧端中转零损耗。
#[test]
fn old_reader_replays_newer_fields_byte_for_byte() {
    let writer = registry_v2();
    let mut customer = sample_customer();
    let original = HierarchicalSerializer::new(&writer)
        .encode_to_vec(&mut customer)
        .expect("新端编码");

    let reader = registry_v1();
    let via_old = HierarchicalSerializer::new(&reader)
        .decode_slice(CUSTOMER, &original)
        .expect("旧端解码不报错");
    let mut via_old = downcast::<Customer>(via_old.as_ref());

    // 旧端看不到 loyalty 的值，但记住了它的字节与来源版本。
    assert_eq!(via_old.loyalty, 0);
    assert_eq!(via_old.state.version(CUSTOMER), Some(2));
    assert!(via_old.state.future_data(CUSTOMER).is_some());

    let replayed = HierarchicalSerializer::new(&reader)
        .encode_to_vec(&mut via_old)
        .expect("旧端再编码");
    assert_eq!(replayed, original);

    // 字节回到新端后 loyalty 原值可见。
    let back = HierarchicalSerializer::new(&writer)
        .decode_slice(CUSTOMER, &replayed)
        .expect("新端解码");
    assert_eq!(downcast::<Customer>(back.as_ref()).loyalty, 7);
}

/// 新端解码旧端数据：缺失的 v2 字段保持默认值，版本标记如实记为 1。
#[test]
fn new_reader_accepts_older_writer() {
    let writer = registry_v1();
    let mut customer = sample_customer();
    let bytes = HierarchicalSerializer::new(&writer)
        .encode_to_vec(&mut customer)
        .expect("旧端编码");

    let reader = registry_v2();
    let decoded = HierarchicalSerializer::new(&reader)
        .decode_slice(CUSTOMER, &bytes)
        .expect("新端解码");
    let decoded = downcast::<Customer>(decoded.as_ref());
    assert_eq!(decoded.loyalty, 0);
    assert_eq!(decoded.id, 42);
    assert_eq!(decoded.state.version(CUSTOMER), Some(1));
}

/// 版本标记永不回退：携带 v2 状态的实例即使经由 v1 注册表编码，
/// 段标记仍是 2。
#[test]
fn version_marker_never_regresses() {
    let writer = registry_v2();
    let mut customer = sample_customer();
    let v2_bytes = HierarchicalSerializer::new(&writer)
        .encode_to_vec(&mut customer)
        .expect("编码");

    let reader = registry_v1();
    let serializer = HierarchicalSerializer::new(&reader);
    let decoded = serializer.decode_slice(CUSTOMER, &v2_bytes).expect("解码");
    let mut decoded = downcast::<Customer>(decoded.as_ref());
    let replayed = serializer.encode_to_vec(&mut decoded).expect("再编码");

    let reparsed = HierarchicalSerializer::new(&writer)
        .decode_slice(CUSTOMER, &replayed)
        .expect("重读");
    assert_eq!(
        downcast::<Customer>(reparsed.as_ref()).state.version(CUSTOMER),
        Some(2)
    );
}

/// 链上出现完全未注册的祖先类型：该段被结构化跳过，Evolvable 实例将其
/// 整段字节保留为 future data，再编码原样复原。
#[test]
fn unknown_ancestor_segment_is_preserved() {
    let writer = registry_v2();
    let mut customer = sample_customer();
    let original = HierarchicalSerializer::new(&writer)
        .encode_to_vec(&mut customer)
        .expect("编码");

    let reader = registry_orphan();
    let serializer = HierarchicalSerializer::new(&reader);
    let decoded = serializer.decode_slice(CUSTOMER, &original).expect("解码");
    let mut decoded = downcast::<Customer>(decoded.as_ref());

    // Person 段对该注册表不可见：业务字段保持默认，字节整段留存。
    assert_eq!(decoded.name, "");
    assert_eq!(decoded.birth_year, 0);
    assert!(decoded.state.future_data(PERSON).is_some());
    assert_eq!(decoded.state.version(PERSON), Some(1));

    let replayed = serializer.encode_to_vec(&mut decoded).expect("再编码");
    assert_eq!(replayed, original);
}

/// 注册声明与实例能力不一致是注册配置错误，而非运行期未定义行为。
#[test]
fn capability_mismatch_is_a_configuration_error() {
    let registry = TypeRegistry::new();
    // Person 实例不携带 Evolvable 状态，却按 Evolvable 注册。
    registry
        .register(
            TypeRegistration::of::<Person>(PERSON, "Person", 1)
                .evolvable()
                .with_field("birth_year", 1, FieldKind::Primitive(PrimitiveKind::I32))
                .with_field("name", 1, FieldKind::Text)
                .with_factory(|| Box::new(Person::default())),
        )
        .expect("注册");
    let serializer = HierarchicalSerializer::new(&registry);
    let err = serializer
        .encode_to_vec(&mut Person::default())
        .expect_err("能力不一致必须失败");
    assert_eq!(err.code(), codes::CONFIG_EVOLVABLE_MISMATCH);
}

/// 引入版本超出声明版本的字段表在注册期即被拒绝。
#[test]
fn field_from_the_future_is_rejected_at_registration() {
    let registry = TypeRegistry::new();
    let err = registry
        .register(
            TypeRegistration::of::<Person>(PERSON, "Person", 1)
                .with_field("name", 2, FieldKind::Text),
        )
        .expect_err("版本越界");
    assert_eq!(err.code(), codes::CONFIG_BAD_VERSION);
}
