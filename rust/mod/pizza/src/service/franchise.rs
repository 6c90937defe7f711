use std::collections::HashMap;

use tracing::info;

use pizza_core::{ListParams, ServiceError};

use crate::model::{
    AuthUser, CreateFranchise, CreateStore, Franchise, FranchiseAdmin, FranchiseList,
    FranchiseView, Permission, Store, StoreView, UserRole,
};
use crate::service::{name_matches, PizzaService};

const FRANCHISE_NAME_INDEX: &str = "franchise_name";

impl PizzaService {
    /// List franchises, optionally filtered by name. Auditors also see
    /// franchise admins and store revenue.
    pub fn list_franchises(
        &self,
        caller: Option<&AuthUser>,
        params: &ListParams,
    ) -> Result<FranchiseList, ServiceError> {
        let detailed = caller.is_some_and(|c| c.can(Permission::AuditFranchises));
        let pattern = params.name.as_deref();
        let all = self
            .franchises
            .list_where(|f| name_matches(pattern, &f.name))?;
        let page = params.paginate(all);

        Ok(FranchiseList {
            franchises: self.franchise_views(page.items, detailed)?,
            more: page.more,
        })
    }

    /// Franchises administered by `user_id`. Callers other than the user
    /// themselves need audit rights; without them the list is empty.
    pub fn list_user_franchises(
        &self,
        caller: &AuthUser,
        user_id: u64,
    ) -> Result<Vec<FranchiseView>, ServiceError> {
        if caller.id != user_id && !caller.can(Permission::AuditFranchises) {
            return Ok(Vec::new());
        }
        let owned = self
            .franchises
            .list_where(|f| f.admin_ids.contains(&user_id))?;
        self.franchise_views(owned, true)
    }

    /// Create a franchise and make each listed user its franchisee.
    pub fn create_franchise(
        &self,
        caller: &AuthUser,
        input: CreateFranchise,
    ) -> Result<FranchiseView, ServiceError> {
        caller.require(Permission::CreateFranchise, "create a franchise")?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("franchise name is required".into()));
        }

        let mut admin_ids = Vec::with_capacity(input.admins.len());
        for admin in &input.admins {
            let user = self.find_user_by_email(&admin.email)?.ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "unknown user for franchise admin {} provided",
                    admin.email
                ))
            })?;
            if !admin_ids.contains(&user.id) {
                admin_ids.push(user.id);
            }
        }

        let taken = || ServiceError::Conflict(format!("franchise '{}' already exists", name));
        if self.lookup_unique(FRANCHISE_NAME_INDEX, name)?.is_some() {
            return Err(taken());
        }

        let franchise = self.franchises.save_new(Franchise {
            id: 0,
            name: name.to_string(),
            admin_ids,
            created_at: String::new(),
        })?;
        if !self.claim_unique(FRANCHISE_NAME_INDEX, name, franchise.id)? {
            self.franchises.delete(franchise.id)?;
            return Err(taken());
        }

        for user_id in &franchise.admin_ids {
            self.grant_role(*user_id, UserRole::franchisee(franchise.id))?;
        }
        info!(franchise_id = franchise.id, created_by = caller.id, "created franchise '{}'", franchise.name);

        let mut views = self.franchise_views(vec![franchise], true)?;
        views
            .pop()
            .ok_or_else(|| ServiceError::Internal("franchise view missing".into()))
    }

    /// Delete a franchise, its stores, and the franchisee roles scoped to it.
    ///
    /// Permission is checked before existence.
    pub fn delete_franchise(&self, caller: &AuthUser, id: u64) -> Result<(), ServiceError> {
        caller.require(Permission::DeleteFranchise, "delete a franchise")?;
        let franchise = self.franchises.get_or_err(id)?;

        for store in self.stores.list_where(|s| s.franchise_id == id)? {
            self.stores.delete(store.id)?;
        }
        self.franchises.delete(id)?;
        self.release_unique(FRANCHISE_NAME_INDEX, &franchise.name)?;

        let role = UserRole::franchisee(id);
        for user_id in &franchise.admin_ids {
            self.revoke_role(*user_id, &role)?;
        }
        info!(franchise_id = id, deleted_by = caller.id, "deleted franchise '{}'", franchise.name);
        Ok(())
    }

    pub fn create_store(
        &self,
        caller: &AuthUser,
        franchise_id: u64,
        input: CreateStore,
    ) -> Result<Store, ServiceError> {
        self.authorize_franchise(caller, franchise_id, "create a store")?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("store name is required".into()));
        }

        let store = self.stores.save_new(Store {
            id: 0,
            franchise_id,
            name: name.to_string(),
        })?;
        info!(store_id = store.id, franchise_id, "created store '{}'", store.name);
        Ok(store)
    }

    pub fn delete_store(
        &self,
        caller: &AuthUser,
        franchise_id: u64,
        store_id: u64,
    ) -> Result<(), ServiceError> {
        self.authorize_franchise(caller, franchise_id, "delete a store")?;

        match self.stores.get(store_id)? {
            Some(store) if store.franchise_id == franchise_id => {}
            _ => {
                return Err(ServiceError::NotFound(format!(
                    "store {} not found in franchise {}",
                    store_id, franchise_id
                )))
            }
        }
        self.stores.delete(store_id)?;
        info!(store_id, franchise_id, "deleted store");
        Ok(())
    }

    /// Check that the caller manages the franchise.
    ///
    /// Callers who would be allowed learn that a franchise is missing (404);
    /// everyone else is refused without learning whether it exists (403).
    fn authorize_franchise(
        &self,
        caller: &AuthUser,
        franchise_id: u64,
        action: &str,
    ) -> Result<Franchise, ServiceError> {
        caller.require(Permission::ManageFranchise(franchise_id), action)?;
        self.franchises.get_or_err(franchise_id)
    }

    /// Revenue per store id, summed over every order line.
    fn store_revenue(&self) -> Result<HashMap<u64, f64>, ServiceError> {
        let mut revenue = HashMap::new();
        for order in self.orders.list()? {
            let total: f64 = order.items.iter().map(|i| i.price).sum();
            *revenue.entry(order.store_id).or_insert(0.0) += total;
        }
        Ok(revenue)
    }

    fn franchise_views(
        &self,
        franchises: Vec<Franchise>,
        detailed: bool,
    ) -> Result<Vec<FranchiseView>, ServiceError> {
        let mut stores_by_franchise: HashMap<u64, Vec<Store>> = HashMap::new();
        for store in self.stores.list()? {
            stores_by_franchise.entry(store.franchise_id).or_default().push(store);
        }
        let revenue = if detailed {
            Some(self.store_revenue()?)
        } else {
            None
        };

        let mut views = Vec::with_capacity(franchises.len());
        for franchise in franchises {
            let stores = stores_by_franchise
                .remove(&franchise.id)
                .unwrap_or_default()
                .into_iter()
                .map(|s| StoreView {
                    id: s.id,
                    name: s.name,
                    total_revenue: revenue
                        .as_ref()
                        .map(|r| r.get(&s.id).copied().unwrap_or(0.0)),
                })
                .collect();

            let admins = if detailed {
                let mut admins = Vec::with_capacity(franchise.admin_ids.len());
                for user_id in &franchise.admin_ids {
                    if let Some(user) = self.users.get(*user_id)? {
                        admins.push(FranchiseAdmin {
                            id: user.id,
                            name: user.name,
                            email: user.email,
                        });
                    }
                }
                Some(admins)
            } else {
                None
            };

            views.push(FranchiseView {
                id: franchise.id,
                name: franchise.name,
                admins,
                stores,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdminRef, Role};
    use crate::service::testing::{admin, diner, service};

    fn pocket(admins: &[&str]) -> CreateFranchise {
        CreateFranchise {
            name: "pizzaPocket".into(),
            admins: admins.iter().map(|e| AdminRef { email: e.to_string() }).collect(),
        }
    }

    #[test]
    fn test_create_franchise_grants_franchisee() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let owner = diner(&svc, "olga");

        let f = svc.create_franchise(&root, pocket(&["olga@jwt.com"])).unwrap();
        assert_eq!(f.name, "pizzaPocket");
        let admins = f.admins.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "olga@jwt.com");

        let user = svc.get_user(owner.id).unwrap();
        assert!(user.roles.contains(&UserRole::franchisee(f.id)));
    }

    #[test]
    fn test_create_franchise_rules() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let d = diner(&svc, "pete");

        assert!(matches!(svc.create_franchise(&d, pocket(&[])), Err(ServiceError::PermissionDenied(_))));
        assert!(matches!(
            svc.create_franchise(&root, CreateFranchise { name: "".into(), admins: vec![] }),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create_franchise(&root, pocket(&["nobody@jwt.com"])),
            Err(ServiceError::NotFound(_))
        ));

        svc.create_franchise(&root, pocket(&[])).unwrap();
        assert!(matches!(svc.create_franchise(&root, pocket(&[])), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_franchisee_manages_only_own_stores() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        diner(&svc, "quinn");
        let mine = svc.create_franchise(&root, pocket(&["quinn@jwt.com"])).unwrap();
        let theirs = svc
            .create_franchise(&root, CreateFranchise { name: "other".into(), admins: vec![] })
            .unwrap();

        // Re-authenticate to pick up the new role.
        let quinn = svc.find_user_by_email("quinn@jwt.com").unwrap().unwrap();
        let quinn = svc.authenticate(&svc.issue_token(&quinn).unwrap()).unwrap();
        assert!(quinn.roles.iter().any(|r| r.role == Role::Franchisee));

        let store = svc.create_store(&quinn, mine.id, CreateStore { name: "SLC".into() }).unwrap();
        assert_eq!(store.franchise_id, mine.id);
        assert!(matches!(
            svc.create_store(&quinn, theirs.id, CreateStore { name: "NYC".into() }),
            Err(ServiceError::PermissionDenied(_))
        ));

        svc.delete_store(&quinn, mine.id, store.id).unwrap();
        assert!(matches!(
            svc.delete_store(&quinn, mine.id, store.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_franchise_403_or_404() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let d = diner(&svc, "rose");

        assert!(matches!(svc.delete_franchise(&d, 77), Err(ServiceError::PermissionDenied(_))));
        assert!(matches!(svc.delete_franchise(&root, 77), Err(ServiceError::NotFound(_))));

        let store = CreateStore { name: "x".into() };
        assert!(matches!(svc.create_store(&d, 77, store.clone()), Err(ServiceError::PermissionDenied(_))));
        assert!(matches!(svc.create_store(&root, 77, store), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_store(&d, 77, 1), Err(ServiceError::PermissionDenied(_))));
        assert!(matches!(svc.delete_store(&root, 77, 1), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_delete_franchise_cleans_up() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let owner = diner(&svc, "sam");
        let f = svc.create_franchise(&root, pocket(&["sam@jwt.com"])).unwrap();
        svc.create_store(&root, f.id, CreateStore { name: "SLC".into() }).unwrap();

        svc.delete_franchise(&root, f.id).unwrap();

        assert!(svc.stores.list().unwrap().is_empty());
        assert_eq!(svc.get_user(owner.id).unwrap().roles, vec![UserRole::diner()]);
        // Name is free again.
        svc.create_franchise(&root, pocket(&[])).unwrap();
    }

    #[test]
    fn test_list_views_depend_on_caller() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let d = diner(&svc, "tom");
        for name in ["alpha", "beta", "gamma"] {
            let f = svc
                .create_franchise(&root, CreateFranchise { name: name.into(), admins: vec![] })
                .unwrap();
            svc.create_store(&root, f.id, CreateStore { name: format!("{} store", name) }).unwrap();
        }

        let params = ListParams { page: 0, limit: 2, name: None };
        let public = svc.list_franchises(None, &params).unwrap();
        assert_eq!(public.franchises.len(), 2);
        assert!(public.more);
        assert!(public.franchises[0].admins.is_none());
        assert!(public.franchises[0].stores[0].total_revenue.is_none());

        let as_diner = svc.list_franchises(Some(&d), &params).unwrap();
        assert!(as_diner.franchises[0].admins.is_none());

        let audited = svc.list_franchises(Some(&root), &params).unwrap();
        assert!(audited.franchises[0].admins.is_some());
        assert_eq!(audited.franchises[0].stores[0].total_revenue, Some(0.0));

        let filtered = svc
            .list_franchises(None, &ListParams { name: Some("g*".into()), ..Default::default() })
            .unwrap();
        assert_eq!(filtered.franchises.len(), 1);
        assert_eq!(filtered.franchises[0].name, "gamma");
    }

    #[test]
    fn test_user_franchises_visibility() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let owner = diner(&svc, "uma");
        let stranger = diner(&svc, "vic");
        svc.create_franchise(&root, pocket(&["uma@jwt.com"])).unwrap();

        assert_eq!(svc.list_user_franchises(&owner, owner.id).unwrap().len(), 1);
        assert_eq!(svc.list_user_franchises(&root, owner.id).unwrap().len(), 1);
        assert!(svc.list_user_franchises(&stranger, owner.id).unwrap().is_empty());
    }
}
