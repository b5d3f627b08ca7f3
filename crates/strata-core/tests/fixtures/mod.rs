//! 集成测试共享夹具：一棵三层业务对象图及多版本注册表。
//!
//! 类型关系：`Order` 持有嵌套 `Customer`；`Customer` 继承 `Person` 并携带
//! Evolvable 状态，v2 新增 `loyalty` 字段；`Bundle` 覆盖集合与映射类别。

#![allow(dead_code)]

use strata_core::error::codes;
use strata_core::prelude::*;
use strata_core::schema::ElementHint;
use strata_core::value::Value;

pub const PERSON: i32 = 1000;
pub const CUSTOMER: i32 = 1001;
pub const ADDRESS: i32 = 1002;
pub const ORDER: i32 = 1003;
pub const BUNDLE: i32 = 1004;

fn unexpected(type_id: i32, index: u16) -> CodecError {
    CodecError::new(
        codes::DECODE_TYPE_MISMATCH,
        format!("fixture has no field ({type_id}, {index})"),
    )
}

/// 地址：纯值类型，无继承、无演进状态。
/// 索引按 (版本, 名称) 排定：city=0、street=1、zip=2。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zip: i32,
}

impl PortableObject for Address {
    fn read_field(&self, type_id: i32, index: u16) -> strata_core::Result<Value> {
        match (type_id, index) {
            (ADDRESS, 0) => Ok(Value::Text(self.city.clone())),
            (ADDRESS, 1) => Ok(Value::Text(self.street.clone())),
            (ADDRESS, 2) => Ok(Value::I32(self.zip)),
            _ => Err(unexpected(type_id, index)),
        }
    }

    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> strata_core::Result<()> {
        match (type_id, index, value) {
            (ADDRESS, 0, Value::Text(v)) => self.city = v,
            (ADDRESS, 1, Value::Text(v)) => self.street = v,
            (ADDRESS, 2, Value::I32(v)) => self.zip = v,
            (_, _, _) => return Err(unexpected(type_id, index)),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    fn clone_portable(&self) -> Box<dyn PortableObject> {
        Box::new(self.clone())
    }

    fn portable_eq(&self, other: &dyn PortableObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o == self)
    }
}

/// 人员：`Customer` 的父类型，也可独立编码。
/// 索引：birth_year=0、name=1。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub birth_year: i32,
    pub name: String,
}

impl PortableObject for Person {
    fn read_field(&self, type_id: i32, index: u16) -> strata_core::Result<Value> {
        match (type_id, index) {
            (PERSON, 0) => Ok(Value::I32(self.birth_year)),
            (PERSON, 1) => Ok(Value::Text(self.name.clone())),
            _ => Err(unexpected(type_id, index)),
        }
    }

    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> strata_core::Result<()> {
        match (type_id, index, value) {
            (PERSON, 0, Value::I32(v)) => self.birth_year = v,
            (PERSON, 1, Value::Text(v)) => self.name = v,
            (_, _, _) => return Err(unexpected(type_id, index)),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    fn clone_portable(&self) -> Box<dyn PortableObject> {
        Box::new(self.clone())
    }

    fn portable_eq(&self, other: &dyn PortableObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o == self)
    }
}

/// 客户：继承 `Person`，携带 Evolvable 状态。
/// v1 索引：address=0、id=1；v2 追加 loyalty=2（按版本排在所有 v1 字段之后）。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Customer {
    pub birth_year: i32,
    pub name: String,
    pub address: Address,
    pub id: i64,
    pub loyalty: i32,
    pub state: EvolvableState,
}

impl PortableObject for Customer {
    fn read_field(&self, type_id: i32, index: u16) -> strata_core::Result<Value> {
        match (type_id, index) {
            (PERSON, 0) => Ok(Value::I32(self.birth_year)),
            (PERSON, 1) => Ok(Value::Text(self.name.clone())),
            (CUSTOMER, 0) => Ok(Value::Object(Box::new(self.address.clone()))),
            (CUSTOMER, 1) => Ok(Value::I64(self.id)),
            (CUSTOMER, 2) => Ok(Value::I32(self.loyalty)),
            _ => Err(unexpected(type_id, index)),
        }
    }

    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> strata_core::Result<()> {
        match (type_id, index, value) {
            (PERSON, 0, Value::I32(v)) => self.birth_year = v,
            (PERSON, 1, Value::Text(v)) => self.name = v,
            (CUSTOMER, 0, Value::Object(object)) => {
                let address = object
                    .as_any()
                    .downcast_ref::<Address>()
                    .ok_or_else(|| unexpected(type_id, index))?;
                self.address = address.clone();
            }
            (CUSTOMER, 1, Value::I64(v)) => self.id = v,
            (CUSTOMER, 2, Value::I32(v)) => self.loyalty = v,
            (_, _, _) => return Err(unexpected(type_id, index)),
        }
        Ok(())
    }

    fn evolvable(&self) -> Option<&EvolvableState> {
        Some(&self.state)
    }

    fn evolvable_mut(&mut self) -> Option<&mut EvolvableState> {
        Some(&mut self.state)
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    fn clone_portable(&self) -> Box<dyn PortableObject> {
        Box::new(self.clone())
    }

    fn portable_eq(&self, other: &dyn PortableObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o == self)
    }
}

/// 订单：通过嵌套 `Customer` 构成三层对象图。
/// 索引：customer=0、tags=1、total=2。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Order {
    pub customer: Customer,
    pub tags: Vec<String>,
    pub total: Decimal,
}

impl PortableObject for Order {
    fn read_field(&self, type_id: i32, index: u16) -> strata_core::Result<Value> {
        match (type_id, index) {
            (ORDER, 0) => Ok(Value::Object(Box::new(self.customer.clone()))),
            (ORDER, 1) => Ok(Value::Collection(
                self.tags.iter().cloned().map(Value::Text).collect(),
            )),
            (ORDER, 2) => Ok(Value::Decimal(self.total)),
            _ => Err(unexpected(type_id, index)),
        }
    }

    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> strata_core::Result<()> {
        match (type_id, index, value) {
            (ORDER, 0, Value::Object(object)) => {
                let customer = object
                    .as_any()
                    .downcast_ref::<Customer>()
                    .ok_or_else(|| unexpected(type_id, index))?;
                self.customer = customer.clone();
            }
            (ORDER, 1, Value::Collection(items)) => {
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Text(tag) = item else {
                        return Err(unexpected(type_id, index));
                    };
                    tags.push(tag);
                }
                self.tags = tags;
            }
            (ORDER, 2, Value::Decimal(v)) => self.total = v,
            (_, _, _) => return Err(unexpected(type_id, index)),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    fn clone_portable(&self) -> Box<dyn PortableObject> {
        Box::new(self.clone())
    }

    fn portable_eq(&self, other: &dyn PortableObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o == self)
    }
}

/// 集合/映射覆盖型夹具。
/// 索引：homes=0（同构对象集合）、items=1（异构集合）、lookup=2（映射）。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
    pub homes: Vec<Address>,
    pub items: Vec<Value>,
    pub lookup: Vec<(Value, Value)>,
}

impl PortableObject for Bundle {
    fn read_field(&self, type_id: i32, index: u16) -> strata_core::Result<Value> {
        match (type_id, index) {
            (BUNDLE, 0) => Ok(Value::Collection(
                self.homes
                    .iter()
                    .map(|home| Value::Object(Box::new(home.clone()) as Box<dyn PortableObject>))
                    .collect(),
            )),
            (BUNDLE, 1) => Ok(Value::Collection(self.items.clone())),
            (BUNDLE, 2) => Ok(Value::Map(self.lookup.clone())),
            _ => Err(unexpected(type_id, index)),
        }
    }

    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> strata_core::Result<()> {
        match (type_id, index, value) {
            (BUNDLE, 0, Value::Collection(items)) => {
                let mut homes = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(object) = item else {
                        return Err(unexpected(type_id, index));
                    };
                    let home = object
                        .as_any()
                        .downcast_ref::<Address>()
                        .ok_or_else(|| unexpected(type_id, index))?;
                    homes.push(home.clone());
                }
                self.homes = homes;
            }
            (BUNDLE, 1, Value::Collection(items)) => self.items = items,
            (BUNDLE, 2, Value::Map(entries)) => self.lookup = entries,
            (_, _, _) => return Err(unexpected(type_id, index)),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    fn clone_portable(&self) -> Box<dyn PortableObject> {
        Box::new(self.clone())
    }

    fn portable_eq(&self, other: &dyn PortableObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o == self)
    }
}

fn register_address(registry: &TypeRegistry) {
    registry
        .register(
            TypeRegistration::of::<Address>(ADDRESS, "Address", 1)
                .with_field("city", 1, FieldKind::Text)
                .with_field("street", 1, FieldKind::Text)
                .with_field("zip", 1, FieldKind::Primitive(PrimitiveKind::I32))
                .with_factory(|| Box::new(Address::default())),
        )
        .expect("注册 Address");
}

fn register_person(registry: &TypeRegistry) {
    registry
        .register(
            TypeRegistration::of::<Person>(PERSON, "Person", 1)
                .with_field("birth_year", 1, FieldKind::Primitive(PrimitiveKind::I32))
                .with_field("name", 1, FieldKind::Text)
                .with_factory(|| Box::new(Person::default())),
        )
        .expect("注册 Person");
}

fn customer_v1() -> TypeRegistration {
    TypeRegistration::of::<Customer>(CUSTOMER, "Customer", 1)
        .with_super(PERSON)
        .evolvable()
        .with_field("address", 1, FieldKind::Nested { type_id: ADDRESS })
        .with_field("id", 1, FieldKind::Primitive(PrimitiveKind::I64))
        .with_factory(|| Box::new(Customer::default()))
}

fn customer_v2() -> TypeRegistration {
    TypeRegistration::of::<Customer>(CUSTOMER, "Customer", 2)
        .with_super(PERSON)
        .evolvable()
        .with_field("address", 1, FieldKind::Nested { type_id: ADDRESS })
        .with_field("id", 1, FieldKind::Primitive(PrimitiveKind::I64))
        .with_field("loyalty", 2, FieldKind::Primitive(PrimitiveKind::I32))
        .with_factory(|| Box::new(Customer::default()))
}

fn register_order(registry: &TypeRegistry) {
    registry
        .register(
            TypeRegistration::of::<Order>(ORDER, "Order", 1)
                .with_field("customer", 1, FieldKind::Nested { type_id: CUSTOMER })
                .with_field(
                    "tags",
                    1,
                    FieldKind::Collection(ElementHint::Uniform(ElementType::Text)),
                )
                .with_field("total", 1, FieldKind::Decimal)
                .with_factory(|| Box::new(Order::default())),
        )
        .expect("注册 Order");
}

/// 完整注册表：全部类型均为最新声明版本。
pub fn registry_v2() -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_address(&registry);
    register_person(&registry);
    registry.register(customer_v2()).expect("注册 Customer v2");
    register_order(&registry);
    registry
}

/// 旧端注册表：`Customer` 仍停留在 v1，不认识 `loyalty`。
pub fn registry_v1() -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_address(&registry);
    register_person(&registry);
    registry.register(customer_v1()).expect("注册 Customer v1");
    register_order(&registry);
    registry
}

/// 残缺注册表：完全不认识 `Person`，`Customer` 不声明父类型。
/// 用于覆盖“链上出现未注册祖先段”的解码路径。
pub fn registry_orphan() -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_address(&registry);
    registry
        .register(
            TypeRegistration::of::<Customer>(CUSTOMER, "Customer", 2)
                .evolvable()
                .with_field("address", 1, FieldKind::Nested { type_id: ADDRESS })
                .with_field("id", 1, FieldKind::Primitive(PrimitiveKind::I64))
                .with_field("loyalty", 2, FieldKind::Primitive(PrimitiveKind::I32))
                .with_factory(|| Box::new(Customer::default())),
        )
        .expect("注册无父 Customer");
    registry
}

/// 集合覆盖注册表。
pub fn registry_bundle() -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_address(&registry);
    registry
        .register(
            TypeRegistration::of::<Bundle>(BUNDLE, "Bundle", 1)
                .with_field(
                    "homes",
                    1,
                    FieldKind::Collection(ElementHint::Uniform(ElementType::Object(ADDRESS))),
                )
                .with_field("items", 1, FieldKind::Collection(ElementHint::Mixed))
                .with_field(
                    "lookup",
                    1,
                    FieldKind::Map {
                        key: ElementHint::Uniform(ElementType::Text),
                        value: ElementHint::Mixed,
                    },
                )
                .with_factory(|| Box::new(Bundle::default())),
        )
        .expect("注册 Bundle");
    registry
}

pub fn sample_address() -> Address {
    Address {
        city: String::from("Hangzhou"),
        street: String::from("1 West Lake Rd"),
        zip: 310000,
    }
}

pub fn sample_customer() -> Customer {
    Customer {
        birth_year: 1988,
        name: String::from("Lin Wei"),
        address: sample_address(),
        id: 42,
        loyalty: 7,
        state: EvolvableState::new(),
    }
}

pub fn sample_order() -> Order {
    Order {
        customer: sample_customer(),
        tags: vec![String::from("vip"), String::from("fragile")],
        total: Decimal::new(123_450, 2),
    }
}

/// 把解码结果向下转型为具体夹具类型。
pub fn downcast<T: Clone + 'static>(object: &dyn PortableObject) -> T {
    object
        .as_any()
        .downcast_ref::<T>()
        .expect("解码结果应为夹具类型")
        .clone()
}
