//! S3 object store

use std::sync::Arc;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::Runtime;

use crate::domain::ports::{
    ObjectPage, ObjectStore, ObjectVersion, StoreError, StoreResult, VersionCursor, VersionPage,
};

pub struct AwsObjectStore {
    runtime: Arc<Runtime>,
    client: Client,
    region: Option<String>,
    endpoint: Option<String>,
}

impl AwsObjectStore {
    pub fn new(
        runtime: Arc<Runtime>,
        client: Client,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            runtime,
            client,
            region,
            endpoint,
        }
    }
}

fn store_error<E, R>(bucket: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + ProvideErrorMetadata + 'static,
    R: std::fmt::Debug,
{
    let code = err.as_service_error().and_then(|e| e.code());
    match code {
        Some("NoSuchBucket") => StoreError::NoSuchBucket(bucket.to_string()),
        Some("BucketNotEmpty") => StoreError::BucketNotEmpty(bucket.to_string()),
        _ => StoreError::Service(DisplayErrorContext(&err).to_string()),
    }
}

impl ObjectStore for AwsObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StoreResult<()> {
        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .body(ByteStream::from(body.to_vec()))
                    .send(),
            )
            .map(|_| ())
            .map_err(|e| store_error(bucket, e))
    }

    fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.runtime.block_on(async {
            match self.client.get_object().bucket(bucket).key(key).send().await {
                Ok(output) => {
                    let bytes = output
                        .body
                        .collect()
                        .await
                        .map_err(|e| StoreError::Service(e.to_string()))?
                        .into_bytes();
                    Ok(Some(bytes.to_vec()))
                }
                Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => Ok(None),
                Err(err) => Err(store_error(bucket, err)),
            }
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> StoreResult<String> {
        Ok(match (&self.endpoint, &self.region) {
            (Some(endpoint), _) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
            (None, Some(region)) => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
            (None, None) => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
        })
    }

    fn list_objects(&self, bucket: &str, next_token: Option<&str>) -> StoreResult<ObjectPage> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_objects_v2()
                    .bucket(bucket)
                    .set_continuation_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| store_error(bucket, e))?;

        Ok(ObjectPage {
            keys: output
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect(),
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.runtime
            .block_on(self.client.delete_object().bucket(bucket).key(key).send())
            .map(|_| ())
            .map_err(|e| store_error(bucket, e))
    }

    fn list_object_versions(
        &self,
        bucket: &str,
        cursor: Option<&VersionCursor>,
    ) -> StoreResult<VersionPage> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_object_versions()
                    .bucket(bucket)
                    .set_key_marker(cursor.map(|c| c.key_marker.clone()))
                    .set_version_id_marker(cursor.and_then(|c| c.version_id_marker.clone()))
                    .send(),
            )
            .map_err(|e| store_error(bucket, e))?;

        let versions = output
            .versions()
            .iter()
            .filter_map(|v| Some((v.key()?, v.version_id()?)))
            .chain(
                output
                    .delete_markers()
                    .iter()
                    .filter_map(|m| Some((m.key()?, m.version_id()?))),
            )
            .map(|(key, version_id)| ObjectVersion {
                key: key.to_string(),
                version_id: version_id.to_string(),
            })
            .collect();

        let next = if output.is_truncated().unwrap_or(false) {
            output.next_key_marker().map(|key| VersionCursor {
                key_marker: key.to_string(),
                version_id_marker: output.next_version_id_marker().map(str::to_string),
            })
        } else {
            None
        };
        Ok(VersionPage { versions, next })
    }

    fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str) -> StoreResult<()> {
        self.runtime
            .block_on(
                self.client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .version_id(version_id)
                    .send(),
            )
            .map(|_| ())
            .map_err(|e| store_error(bucket, e))
    }

    fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        self.runtime
            .block_on(self.client.delete_bucket().bucket(bucket).send())
            .map(|_| ())
            .map_err(|e| store_error(bucket, e))
    }
}
