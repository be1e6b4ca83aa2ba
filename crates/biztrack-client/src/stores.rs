//! One [`EntityStore`] per resource the dashboard pages show.

use biztrack_core::{
    Debt, Delivery, Employee, EntityStore, Product, Production, Sale, Supplier,
};

/// Client-side copies of server rows. Unsynchronised: a store only changes
/// when the session writes to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stores {
    pub products: EntityStore<Product>,
    pub sales: EntityStore<Sale>,
    pub debts: EntityStore<Debt>,
    pub deliveries: EntityStore<Delivery>,
    pub productions: EntityStore<Production>,
    pub suppliers: EntityStore<Supplier>,
    pub employees: EntityStore<Employee>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every store. Called when the session ends.
    pub fn clear_all(&mut self) {
        self.products.clear();
        self.sales.clear();
        self.debts.clear();
        self.deliveries.clear();
        self.productions.clear();
        self.suppliers.clear();
        self.employees.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.sales.is_empty()
            && self.debts.is_empty()
            && self.deliveries.is_empty()
            && self.productions.is_empty()
            && self.suppliers.is_empty()
            && self.employees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biztrack_core::SupplierUpdate;
    use chrono::Utc;

    fn supplier(id: &str, name: &str) -> Supplier {
        Supplier {
            id: id.to_string(),
            business_id: "b1".to_string(),
            name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_clear_all() {
        let mut stores = Stores::new();
        assert!(stores.is_empty());

        stores.suppliers.add(supplier("s1", "Flour Mills"));
        stores.suppliers.add(supplier("s2", "Dangote"));
        assert!(!stores.is_empty());

        stores.clear_all();
        assert!(stores.is_empty());
    }

    #[test]
    fn test_update_through_store() {
        let mut stores = Stores::new();
        stores.suppliers.add(supplier("s1", "Old Name"));

        let mut changed = stores.suppliers.get("s1").cloned().unwrap();
        SupplierUpdate {
            name: Some("New Name".to_string()),
            ..Default::default()
        }
        .apply(&mut changed);

        assert!(stores.suppliers.update("s1", changed));
        assert_eq!(stores.suppliers.get("s1").unwrap().name, "New Name");
        assert!(!stores.suppliers.update("missing", supplier("missing", "X")));
        assert_eq!(stores.suppliers.len(), 1);
    }
}
