//! Patient directory REST client

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, warn};

use ortho_core::gateway::{
    Appointment, ContactPhone, MeetingPlatform, PatientDirectoryGateway, PatientRecord,
};

use crate::error::{DirectoryError, Result};

/// Client for the clinic's patient directory API
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DirectoryClient {
    /// Create a new directory client
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        Ok(self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?)
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("directory API error: {} - {}", status, body);
            return Err(DirectoryError::Api(format!("{}: {}", status, body)));
        }
        Ok(response)
    }
}

fn new_patient_payload(cedula: &str, nombre: &str, apellidos: &str) -> Value {
    json!({
        "cedula": cedula,
        "nombre": nombre,
        "apellidos": apellidos,
        "fecha_registro": Utc::now().to_rfc3339(),
    })
}

fn study_payload(patient_id: &str, image_url: &str, image_type: &str) -> Value {
    json!({
        "patient_id": patient_id,
        "image_url": image_url,
        "image_type": image_type,
        "fecha": Utc::now().to_rfc3339(),
    })
}

fn meeting_payload(
    patient_id: Option<&str>,
    platform: MeetingPlatform,
    url: &str,
    meeting_id: &str,
) -> Value {
    json!({
        "patient_id": patient_id,
        "platform": platform.as_str(),
        "meeting_url": url,
        "meeting_id": meeting_id,
        "created_at": Utc::now().to_rfc3339(),
        "status": "scheduled",
    })
}

#[async_trait]
impl PatientDirectoryGateway for DirectoryClient {
    async fn lookup(&self, cedula: &str) -> ortho_core::Result<Option<PatientRecord>> {
        let response = self.get(&format!("/pacientes/cedula/{}", cedula)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record = response
                    .json::<PatientRecord>()
                    .await
                    .map_err(DirectoryError::from)?;
                Ok(Some(record))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!("cedula lookup failed: {} - {}", status, body);
                Err(DirectoryError::Api(format!("{}: {}", status, body)).into())
            }
        }
    }

    async fn create(
        &self,
        cedula: &str,
        nombre: &str,
        apellidos: &str,
    ) -> ortho_core::Result<PatientRecord> {
        let response = self
            .post("/pacientes", &new_patient_payload(cedula, nombre, apellidos))
            .await?;
        let record = response
            .json::<PatientRecord>()
            .await
            .map_err(DirectoryError::from)?;
        Ok(record)
    }

    async fn available_appointments(&self) -> ortho_core::Result<Vec<Appointment>> {
        let response = self.get("/citas/disponibles").await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api(format!("{}: {}", status, body)).into());
        }

        let appointments = response
            .json::<Vec<Appointment>>()
            .await
            .map_err(DirectoryError::from)?;
        Ok(appointments)
    }

    async fn contact_phones(&self) -> ortho_core::Result<Vec<ContactPhone>> {
        let response = self.get("/contactos/telefonos").await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api(format!("{}: {}", status, body)).into());
        }

        let phones = response
            .json::<Vec<ContactPhone>>()
            .await
            .map_err(DirectoryError::from)?;
        Ok(phones)
    }

    async fn save_study(
        &self,
        patient_id: &str,
        image_url: &str,
        image_type: &str,
    ) -> ortho_core::Result<()> {
        self.post("/estudios", &study_payload(patient_id, image_url, image_type))
            .await?;
        Ok(())
    }

    async fn save_meeting(
        &self,
        patient_id: Option<&str>,
        platform: MeetingPlatform,
        url: &str,
        meeting_id: &str,
    ) -> ortho_core::Result<()> {
        self.post(
            "/videollamadas",
            &meeting_payload(patient_id, platform, url, meeting_id),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client =
            DirectoryClient::new("https://example.com/api".to_string(), "key".to_string()).unwrap();
        assert_eq!(client.base_url, "https://example.com/api");
    }

    #[test]
    fn test_new_patient_payload() {
        let payload = new_patient_payload("123456", "Ana", "García");
        assert_eq!(payload["cedula"], "123456");
        assert_eq!(payload["nombre"], "Ana");
        assert_eq!(payload["apellidos"], "García");
        assert!(payload["fecha_registro"].is_string());
    }

    #[test]
    fn test_meeting_payload_with_patient() {
        let payload = meeting_payload(
            Some("42"),
            MeetingPlatform::Zoom,
            "https://zoom.us/j/999",
            "999",
        );
        assert_eq!(payload["patient_id"], "42");
        assert_eq!(payload["platform"], "zoom");
        assert_eq!(payload["meeting_url"], "https://zoom.us/j/999");
        assert_eq!(payload["meeting_id"], "999");
        assert_eq!(payload["status"], "scheduled");
    }

    #[test]
    fn test_meeting_payload_without_patient_is_null() {
        let payload = meeting_payload(None, MeetingPlatform::GoogleMeet, "https://meet", "evt");
        assert!(payload["patient_id"].is_null());
        assert_eq!(payload["platform"], "google_meet");
    }

    #[test]
    fn test_study_payload() {
        let payload = study_payload("42", "https://cdn/image.png", "radiografia");
        assert_eq!(payload["patient_id"], "42");
        assert_eq!(payload["image_type"], "radiografia");
    }
}
