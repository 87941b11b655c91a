use super::{mime, MediaHostService, UploadedMedia};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};
use uuid::Uuid;

pub struct MediaHostClient {
    client: S3Client,
    bucket: String,
    base_url: String,
}

impl MediaHostClient {
    pub async fn new(
        access_key_id: String,
        secret_access_key: String,
        endpoint: String,
        bucket: String,
        base_url: String,
    ) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "media-host",
        );

        // Custom config for S3-compatible hosts (DigitalOcean Spaces et al.)
        let config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("us-east-1")) // region is nominal for these hosts
            .endpoint_url(endpoint)
            .load()
            .await;

        let client = S3Client::new(&config);

        Ok(Self {
            client,
            bucket,
            base_url,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl MediaHostService for MediaHostClient {
    async fn upload_image(
        &self,
        data: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<UploadedMedia> {
        let key = format!(
            "{}/{}.{}",
            folder,
            Uuid::new_v4(),
            mime::extension_for(content_type)
        );

        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Failed to upload file: {}", e)))?;

        tracing::info!("Uploaded {} bytes to {}", data.len(), key);

        Ok(UploadedMedia {
            url: self.public_url(&key),
            id: key,
        })
    }
}
