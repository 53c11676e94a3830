//! Staging a shopping-cart edit and committing or discarding it.
//!
//! A form edits a recorder instead of the live store. The store only
//! changes when the user confirms; cancelling drops the draft.

use serde_json::json;
use statelens::{Host, StateContainer, path};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = StateContainer::new(json!({
        "cart": {"items": [{"sku": "tea", "qty": 1}], "coupon": null},
        "user": {"name": "ada"}
    }));
    store.on_update(|_, new| println!("store changed: {}", new["cart"]));

    // First edit: bump the quantity and apply a coupon, then confirm.
    let draft = store.recorder();
    let qty = draft.lens_for(path!("cart", "items", 0, "qty"));
    qty.swap(|q| q.and_then(|q| q.as_u64()).unwrap_or(0) + 2)?;
    draft.set(path!("cart", "coupon", "code"), "SPRING")?;

    println!("draft cart: {}", draft.get("cart")?.unwrap_or_default());
    println!("live cart:  {}", store.get("cart")?.unwrap_or_default());
    store.commit(&draft)?;

    // Second edit: empty the cart, then cancel.
    draft.set(path!("cart", "items"), json!([]))?;
    let items = draft.get(path!("cart", "items"))?.unwrap_or_default();
    println!("draft items before cancel: {items}");
    draft.discard()?;

    println!("final store: {}", store.state()?);
    Ok(())
}
