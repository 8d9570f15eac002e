//! Generated models and request bodies survive an encode/decode cycle.
//!
//! Optional strings are drawn from `None`, `Some("")` and non-empty values so
//! that "send an empty value" and "leave it out" stay distinct on the wire.

use iam_identity::{
    ApiKey, CreateApiKeyOptions, CreateApiKeyRequest, EntityHistoryRecord, IamIdentityClient,
    ResponseContext, UpdateApiKeyOptions,
};
use proptest::prelude::*;
use serde_json::Value;

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _./:-]{0,16}"
}

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z0-9 _-]{1,16}".prop_map(Some),
    ]
}

fn history_record() -> impl Strategy<Value = EntityHistoryRecord> {
    (text(), text(), text(), text(), prop::collection::vec(text(), 0..3), text()).prop_map(
        |(timestamp, iam_id, iam_id_account, action, params, message)| EntityHistoryRecord {
            timestamp,
            iam_id,
            iam_id_account,
            action,
            params,
            message,
        },
    )
}

fn context() -> impl Strategy<Value = Option<ResponseContext>> {
    prop::option::of((optional_text(), optional_text(), optional_text()).prop_map(
        |(transaction_id, operation, host)| ResponseContext {
            transaction_id,
            operation,
            host,
            ..Default::default()
        },
    ))
}

fn api_key() -> impl Strategy<Value = ApiKey> {
    let entity = (context(), text(), optional_text(), text(), any::<bool>(), optional_text(), optional_text());
    let owner = (text(), text(), optional_text(), text(), text(), text());
    let history = prop::collection::vec(history_record(), 0..3);
    (entity, owner, history).prop_map(
        |((context, id, entity_tag, crn, locked, created_at, modified_at),
          (created_by, name, description, iam_id, account_id, apikey),
          history)| ApiKey {
            context,
            id,
            entity_tag,
            crn,
            locked,
            created_at,
            created_by,
            modified_at,
            name,
            description,
            iam_id,
            account_id,
            apikey,
            history,
        },
    )
}

prop_compose! {
    fn create_api_key_options()(
        name in "[a-z]{1,12}",
        iam_id in "iam-[a-z0-9]{1,12}",
        description in optional_text(),
        account_id in optional_text(),
        apikey in optional_text(),
        store_value in prop::option::of(any::<bool>()),
    ) -> CreateApiKeyOptions {
        CreateApiKeyOptions {
            description,
            account_id,
            apikey,
            store_value,
            ..CreateApiKeyOptions::new(name, iam_id)
        }
    }
}

prop_compose! {
    fn update_api_key_options()(
        name in optional_text(),
        description in optional_text(),
    ) -> UpdateApiKeyOptions {
        UpdateApiKeyOptions {
            name,
            description,
            ..UpdateApiKeyOptions::new("ApiKey-1", "1-abc")
        }
    }
}

fn client() -> IamIdentityClient {
    IamIdentityClient::new("https://iam.test.cloud.ibm.com")
}

proptest! {
    #[test]
    fn api_key_decodes_to_what_was_encoded(key in api_key()) {
        let json = serde_json::to_string(&key).unwrap();
        let decoded: ApiKey = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, key);
    }

    #[test]
    fn create_api_key_body_decodes_to_the_same_fields(options in create_api_key_options()) {
        let request = client().build_create_api_key(&options).unwrap();
        let body = request.body.unwrap();
        let sent: CreateApiKeyRequest = serde_json::from_str(&body).unwrap();
        prop_assert_eq!(sent, CreateApiKeyRequest {
            name: options.name.clone(),
            description: options.description.clone(),
            iam_id: options.iam_id.clone(),
            account_id: options.account_id.clone(),
            apikey: options.apikey.clone(),
            store_value: options.store_value,
        });

        // `Some(false)` is a value the service must see
        let raw: Value = serde_json::from_str(&body).unwrap();
        prop_assert_eq!(raw.get("store_value").and_then(Value::as_bool), options.store_value);
    }

    #[test]
    fn update_api_key_body_keeps_empty_strings_and_drops_unset(options in update_api_key_options()) {
        let request = client().build_update_api_key(&options).unwrap();
        let body = request.body.unwrap();
        let raw: Value = serde_json::from_str(&body).unwrap();
        prop_assert_eq!(raw.get("name").and_then(Value::as_str), options.name.as_deref());
        prop_assert_eq!(raw.get("description").and_then(Value::as_str), options.description.as_deref());
        prop_assert!(raw.get("id").is_none());
        prop_assert!(raw.get("if_match").is_none());
    }
}
